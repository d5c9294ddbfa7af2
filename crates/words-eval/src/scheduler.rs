//! Per-object action queues: expansion of custom actions and execution of
//! the atomic ones.
//!
//! Each tick an object runs exactly one executable action. Custom actions at
//! the head of the queue are expanded in place first, as many times as it
//! takes to surface an executable one.

use crate::action::{Action, ActionKind, WaitLength};
use crate::arena::ObjectId;
use crate::env::Environment;
use crate::error::{EvalResult, RuntimeError};
use crate::evaluator::Evaluator;
use crate::scope::CapturedScope;
use crate::value::{Position, Value};
use std::collections::VecDeque;
use tracing::trace;
use words_types::Span;

/// Where `queue` statements put their action.
///
/// While a custom action body runs for `owner`, actions queued on `owner`
/// are collected into `actions` and later spliced in front of the owner's
/// live queue. Actions queued on any other object go straight to that
/// object's live queue.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueTarget {
    Live,
    Expansion {
        owner: ObjectId,
        actions: VecDeque<Action>,
    },
}

impl QueueTarget {
    pub fn expansion(owner: ObjectId) -> Self {
        QueueTarget::Expansion {
            owner,
            actions: VecDeque::new(),
        }
    }

    pub(crate) fn enqueue(&mut self, env: &mut Environment, id: ObjectId, action: Action, now: bool) {
        match self {
            QueueTarget::Expansion { owner, actions } if *owner == id => {
                if now {
                    actions.push_front(action);
                } else {
                    actions.push_back(action);
                }
            }
            _ => {
                if let Some(object) = env.object_mut(id) {
                    if now {
                        object.enqueue_action_at_front(action);
                    } else {
                        object.enqueue_action(action);
                    }
                }
            }
        }
    }

    /// The collected expansion; always empty for `Live`.
    pub fn into_actions(self) -> VecDeque<Action> {
        match self {
            QueueTarget::Live => VecDeque::new(),
            QueueTarget::Expansion { actions, .. } => actions,
        }
    }
}

impl Evaluator {
    /// Run one executable action for `id`, expanding custom actions at the
    /// head of its queue first. An object with nothing to do records an
    /// idle wait. Stale ids are ignored.
    ///
    /// Expansions draw on the step budget, which lasts until the next
    /// [`Evaluator::reset_steps`].
    pub fn execute_next_action(&mut self, id: ObjectId) -> EvalResult<()> {
        loop {
            let Some(object) = self.env.object_mut(id) else {
                return Ok(());
            };
            if !object.head_is_expandable() {
                break;
            }
            let Some(action) = object.pop_action() else {
                break;
            };
            self.consume_step(Span::line(action.line))?;
            let expansion = self.expand_action(id, &action)?;
            match self.env.object_mut(id) {
                Some(object) => object.splice_front(expansion),
                None => return Ok(()),
            }
        }

        let Some(object) = self.env.object_mut(id) else {
            return Ok(());
        };
        match object.pop_action() {
            Some(action) => {
                object.set_last_action(action.clone());
                trace!(object = object.name(), %action, "executing");
                self.execute_action(id, action)
            }
            None => {
                object.set_last_action(Action::idle());
                Ok(())
            }
        }
    }

    /// Run the body of a custom action and return the actions it queued on
    /// its own object.
    ///
    /// # Panics
    ///
    /// If `action` is executable.
    pub fn expand_action(&mut self, id: ObjectId, action: &Action) -> EvalResult<VecDeque<Action>> {
        let ActionKind::Custom { name, args } = &action.kind else {
            panic!("cannot expand executable action `{action}`");
        };
        let span = Span::line(action.line);
        let class = self
            .env
            .object(id)
            .map(|o| o.class())
            .ok_or_else(|| RuntimeError::ObjectNotFound(id.to_string()).at(span))?;
        let def = self
            .env
            .classes()
            .action(class, name)
            .cloned()
            .ok_or_else(|| {
                RuntimeError::UndefinedAction {
                    class: self.env.classes().get(class).name.clone(),
                    action: name.clone(),
                }
                .at(span)
            })?;
        if def.params.len() != args.len() {
            return Err(RuntimeError::ArgumentCount {
                action: name.clone(),
                expected: def.params.len(),
                actual: args.len(),
            }
            .at(span));
        }

        self.env.enter_scope();
        self.env.bind(&self.config.bind_self_as, Value::Object(id));
        for (param, arg) in def.params.iter().zip(args) {
            self.env.bind(&param.name, arg.clone());
        }
        let mut target = QueueTarget::expansion(id);
        self.exec_block(&def.body, &mut target);
        self.env.exit_scope();

        let actions = target.into_actions();
        trace!(action = %name, produced = actions.len(), "expanded");
        Ok(actions)
    }

    /// Apply one executable action to `id`.
    ///
    /// # Panics
    ///
    /// If `action` is a custom action.
    pub fn execute_action(&mut self, id: ObjectId, action: Action) -> EvalResult<()> {
        let line = action.line;
        match action.kind {
            ActionKind::Move {
                direction,
                distance,
                scope,
            } => {
                let distance = self.with_captured_scope(&scope, |eval| eval.eval_number(&distance))?;
                let out_of_range = || RuntimeError::NumberOutOfRange(distance).at(Span::line(line));
                let steps = Position::coordinate(distance).ok_or_else(out_of_range)?;
                if let Some(object) = self.env.object_mut(id) {
                    let position = object
                        .position()
                        .offset(direction, steps)
                        .ok_or_else(out_of_range)?;
                    object.set_position(position);
                }
                Ok(())
            }
            ActionKind::Say { message } => {
                if let Some(object) = self.env.object_mut(id) {
                    object.set_message(message);
                }
                Ok(())
            }
            ActionKind::Wait { length } => {
                let ticks = match length {
                    WaitLength::Ticks(n) => n,
                    WaitLength::Pending { duration, scope } => {
                        let n = self.with_captured_scope(&scope, |eval| eval.eval_number(&duration))?;
                        if !n.is_finite() {
                            return Err(RuntimeError::NumberOutOfRange(n).at(Span::line(line)));
                        }
                        if n > 1.0 {
                            n.floor() as u64
                        } else {
                            1
                        }
                    }
                };
                if ticks > 1 {
                    if let Some(object) = self.env.object_mut(id) {
                        let rest = ActionKind::Wait {
                            length: WaitLength::Ticks(ticks - 1),
                        };
                        object.enqueue_action_at_front(Action::new(rest, line));
                    }
                }
                Ok(())
            }
            ActionKind::Stop => {
                if let Some(object) = self.env.object_mut(id) {
                    object.clear_action_queue();
                }
                Ok(())
            }
            ActionKind::Assign { properties, scope } => self.with_captured_scope(&scope, |eval| {
                for def in &properties {
                    let value = eval.eval_expr(&def.value)?;
                    eval.env
                        .set_property(id, &def.name.name, value)
                        .map_err(|e| e.at(def.span))?;
                }
                Ok(())
            }),
            ActionKind::Custom { name, .. } => {
                panic!("cannot execute custom action `{name}` before expanding it")
            }
        }
    }

    fn with_captured_scope<T>(&mut self, scope: &CapturedScope, f: impl FnOnce(&mut Self) -> T) -> T {
        self.env.enter_captured_scope(scope);
        let result = f(self);
        self.env.exit_scope();
        result
    }
}
