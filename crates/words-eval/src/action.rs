//! Schedulable units of object behavior.
//!
//! An action is either *executable* (it has one atomic effect when it reaches
//! the head of the queue) or *expandable* (a macro that is replaced by the
//! actions it produces). `Custom` is the only expandable kind.

use crate::scope::CapturedScope;
use crate::value::Value;
use std::fmt;
use words_types::ast::{Direction, Expr, PropertyDef};

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub kind: ActionKind,
    /// Line of the statement that enqueued the action.
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    /// Move `distance` cells; the distance is evaluated on execution in the
    /// scope that was live when the action was queued.
    Move {
        direction: Direction,
        distance: Expr,
        scope: CapturedScope,
    },
    Say {
        message: String,
    },
    Wait {
        length: WaitLength,
    },
    /// Drop everything still queued.
    Stop,
    /// Queued property assignment.
    Assign {
        properties: Vec<PropertyDef>,
        scope: CapturedScope,
    },
    /// Invocation of a class-defined custom action.
    Custom {
        name: String,
        args: Vec<Value>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum WaitLength {
    /// Not yet evaluated.
    Pending { duration: Expr, scope: CapturedScope },
    /// Ticks left, counting the one being executed.
    Ticks(u64),
}

impl Action {
    pub fn new(kind: ActionKind, line: u32) -> Self {
        Self { kind, line }
    }

    /// The one-tick wait recorded when an object has nothing to do.
    pub fn idle() -> Self {
        Self::new(
            ActionKind::Wait {
                length: WaitLength::Ticks(1),
            },
            0,
        )
    }

    pub fn is_executable(&self) -> bool {
        !matches!(self.kind, ActionKind::Custom { .. })
    }

    pub fn is_expandable(&self) -> bool {
        !self.is_executable()
    }

    pub fn is_wait(&self) -> bool {
        matches!(self.kind, ActionKind::Wait { .. })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ActionKind::Move { direction, .. } => write!(f, "move {direction}"),
            ActionKind::Say { message } => write!(f, "say \"{message}\""),
            ActionKind::Wait { .. } => write!(f, "wait"),
            ActionKind::Stop => write!(f, "stop"),
            ActionKind::Assign { properties, .. } => {
                let names: Vec<&str> = properties.iter().map(|p| p.name.name.as_str()).collect();
                write!(f, "set {}", names.join(", "))
            }
            ActionKind::Custom { name, .. } => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_custom_is_expandable() {
        let custom = Action::new(
            ActionKind::Custom {
                name: "patrol".into(),
                args: vec![],
            },
            3,
        );
        assert!(custom.is_expandable());
        assert!(!custom.is_executable());

        for kind in [
            ActionKind::Stop,
            ActionKind::Say {
                message: "hi".into(),
            },
        ] {
            let action = Action::new(kind, 1);
            assert!(action.is_executable());
            assert!(!action.is_expandable());
        }
        assert!(Action::idle().is_executable());
    }

    #[test]
    fn test_idle_is_a_wait() {
        let idle = Action::idle();
        assert!(idle.is_wait());
        assert_eq!(idle.to_string(), "wait");
    }
}
