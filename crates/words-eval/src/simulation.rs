//! Simulation: the tick driver around an [`Evaluator`].
//!
//! A tick drains one action from every live object, in arena order, then
//! evaluates global listeners followed by class-level listeners.

use crate::config::EngineConfig;
use crate::env::Environment;
use crate::evaluator::Evaluator;
use crate::snapshot::WorldSnapshot;
use crate::value::Value;
use tracing::debug;
use words_types::ast::{ListenerKind, Program};
use words_types::Diagnostics;

pub struct Simulation {
    eval: Evaluator,
    ticks: u64,
}

impl Simulation {
    pub fn new(config: EngineConfig) -> Self {
        Self::from_evaluator(Evaluator::new(config))
    }

    /// Wrap an evaluator that already carries a sink or source file.
    pub fn from_evaluator(eval: Evaluator) -> Self {
        Self { eval, ticks: 0 }
    }

    /// Run the top-level statements of `program`.
    pub fn run(&mut self, program: &Program) {
        self.eval.run(program);
    }

    #[tracing::instrument(level = "debug", skip_all, fields(tick = self.ticks + 1))]
    pub fn tick(&mut self) {
        if self.eval.env.exited() {
            return;
        }
        self.eval.reset_steps();

        for id in self.eval.env.object_ids() {
            if self.eval.env.exited() {
                break;
            }
            if !self.eval.env.is_live(id) {
                continue;
            }
            if let Err(err) = self.eval.execute_next_action(id) {
                self.eval.report(&err);
            }
        }

        self.fire_global_listeners();
        self.fire_class_listeners();
        self.ticks += 1;
        debug!(objects = self.eval.env.object_count(), "tick complete");
    }

    /// Tick `n` times, stopping early after `exit`.
    pub fn run_ticks(&mut self, n: u64) {
        for _ in 0..n {
            if self.eval.env.exited() {
                break;
            }
            self.tick();
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(&self.eval.env, self.ticks)
    }

    pub fn env(&self) -> &Environment {
        &self.eval.env
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.eval
    }

    pub fn evaluator_mut(&mut self) -> &mut Evaluator {
        &mut self.eval
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        self.eval.diagnostics()
    }

    // ══════════════════════════════════════════════════════════════════════
    // Listeners
    // ══════════════════════════════════════════════════════════════════════

    /// A temporary global listener is dropped after the first tick it fires.
    fn fire_global_listeners(&mut self) {
        let mut index = 0;
        while index < self.eval.env.listeners().len() {
            if self.eval.env.exited() {
                return;
            }
            let listener = self.eval.env.listeners()[index].clone();
            let fired = match self.eval.eval_predicate(&listener.predicate, &listener.body) {
                Ok(value) => value == Value::Boolean(true),
                Err(err) => {
                    self.eval.report(&err);
                    false
                }
            };
            // The body may have reset the world or added listeners.
            let unchanged = self.eval.env.listeners().get(index) == Some(&listener);
            if fired && listener.kind == ListenerKind::Temporary && unchanged {
                self.eval.env.remove_listener(index);
            } else {
                index += 1;
            }
        }
    }

    /// Class listeners run once per live instance with `me` bound to it.
    /// A temporary one is spent per instance.
    fn fire_class_listeners(&mut self) {
        for id in self.eval.env.object_ids() {
            let Some(class) = self.eval.env.object(id).map(|o| o.class()) else {
                continue;
            };
            let chain: Vec<_> = self.eval.env.classes().chain_ids(class).collect();
            for class_id in chain {
                if !self.eval.env.is_live(id) {
                    break;
                }
                let listeners = self.eval.env.classes().get(class_id).listeners.clone();
                for (index, listener) in listeners.iter().enumerate() {
                    if self.eval.env.exited() {
                        return;
                    }
                    let Some(object) = self.eval.env.object(id) else {
                        break;
                    };
                    let temporary = listener.kind == ListenerKind::Temporary;
                    if temporary && object.listener_spent((class_id, index)) {
                        continue;
                    }

                    self.eval.env.enter_scope();
                    let me = self.eval.config.bind_self_as.clone();
                    self.eval.env.bind(&me, Value::Object(id));
                    let result = self.eval.eval_predicate(&listener.predicate, &listener.body);
                    self.eval.env.exit_scope();

                    match result {
                        Ok(Value::Boolean(true)) if temporary => {
                            if let Some(object) = self.eval.env.object_mut(id) {
                                object.spend_listener((class_id, index));
                            }
                        }
                        Ok(_) => {}
                        Err(err) => self.eval.report(&err),
                    }
                }
            }
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
