//! Words tree-walking evaluator.
//!
//! Executes Words programs directly from the AST: classes with single
//! inheritance, named objects on a grid, per-object action queues drained
//! one action per tick, and listeners that react to what objects just did.

pub mod action;
pub mod arena;
pub mod class;
pub mod config;
pub mod diagnostics;
pub mod env;
pub mod error;
pub mod evaluator;
pub mod object;
mod predicate;
mod property;
pub mod scheduler;
pub mod scope;
pub mod simulation;
pub mod snapshot;
pub mod value;

pub use action::{Action, ActionKind, WaitLength};
pub use arena::ObjectId;
pub use config::{ConfigError, EngineConfig};
pub use diagnostics::DiagnosticSink;
pub use env::Environment;
pub use error::{EvalResult, ProgramError, RuntimeError, RuntimeResult};
pub use evaluator::Evaluator;
pub use object::WordsObject;
pub use scheduler::QueueTarget;
pub use simulation::Simulation;
pub use snapshot::{ObjectSnapshot, WorldSnapshot};
pub use value::{Position, Value, ValueKind};
