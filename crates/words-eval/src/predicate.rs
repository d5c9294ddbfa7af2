//! Listener predicates: `says`, `touches`, `waits`, `moves`.

use crate::arena::ObjectId;
use crate::error::{EvalResult, RuntimeError};
use crate::evaluator::Evaluator;
use crate::scheduler::QueueTarget;
use crate::action::ActionKind;
use crate::value::{Value, ValueKind};
use words_types::ast::{Block, Direction, Predicate, PredicateCondition, Subject};

/// A predicate condition with its operands already evaluated.
enum Condition {
    Says(String),
    Touches(Vec<ObjectId>),
    Waits,
    Moves(Option<Direction>),
}

impl Evaluator {
    /// `Text(class)` for a class subject, `Object(id)` for a reference.
    pub fn eval_subject(&self, subject: &Subject) -> EvalResult<Value> {
        match subject {
            Subject::Class(class) => {
                if self.env.classes().id(&class.name).is_none() {
                    return Err(RuntimeError::UndefinedClass(class.name.clone()).at(class.span));
                }
                Ok(Value::Text(class.name.clone()))
            }
            Subject::Reference(reference) => match self.eval_reference(reference)? {
                value @ Value::Object(_) => Ok(value),
                other => Err(RuntimeError::invalid_type(ValueKind::Object, other.kind())
                    .at(reference.span)),
            },
        }
    }

    fn candidates(&self, subject: &Value) -> Vec<ObjectId> {
        match subject {
            Value::Text(class) => self.env.objects_by_class(class),
            Value::Object(id) => vec![*id],
            _ => Vec::new(),
        }
    }

    /// Run `body` once for every subject object satisfying the condition,
    /// with the alias (if any) bound to it. Returns whether anything matched.
    pub fn eval_predicate(&mut self, predicate: &Predicate, body: &Block) -> EvalResult<Value> {
        let subject = self.eval_subject(&predicate.subject)?;
        let condition = match &predicate.condition {
            PredicateCondition::Says(message) => Condition::Says(self.eval_text(message)?),
            PredicateCondition::Touches(other) => {
                let other = self.eval_subject(other)?;
                Condition::Touches(self.candidates(&other))
            }
            PredicateCondition::Waits => Condition::Waits,
            PredicateCondition::Moves(direction) => Condition::Moves(
                direction
                    .as_ref()
                    .map(|d| self.eval_direction(d))
                    .transpose()?,
            ),
        };

        let mut matched = false;
        for id in self.candidates(&subject) {
            if self.env.exited() {
                break;
            }
            if !self.matches(id, &condition) {
                continue;
            }
            matched = true;
            self.env.enter_scope();
            if let Some(alias) = &predicate.alias {
                self.env.bind(&alias.name, Value::Object(id));
            }
            self.exec_block(body, &mut QueueTarget::Live);
            self.env.exit_scope();
        }
        Ok(Value::Boolean(matched))
    }

    fn matches(&self, id: ObjectId, condition: &Condition) -> bool {
        let Some(object) = self.env.object(id) else {
            return false;
        };
        let last = object.last_action().map(|a| &a.kind);
        match condition {
            Condition::Says(text) => {
                matches!(last, Some(ActionKind::Say { .. })) && object.message() == Some(text.as_str())
            }
            Condition::Waits => matches!(last, Some(ActionKind::Wait { .. })),
            Condition::Moves(expected) => match last {
                Some(ActionKind::Move { direction, .. }) => expected.map_or(true, |d| d == *direction),
                _ => false,
            },
            Condition::Touches(others) => others.iter().any(|&other| {
                other != id
                    && self
                        .env
                        .object(other)
                        .is_some_and(|o| o.position().touches(object.position()))
            }),
        }
    }
}
