//! Runtime error types for the Words evaluator.

use crate::value::ValueKind;
use thiserror::Error;
use words_types::{Diagnostic, ErrorCode, Span};

/// A user-script fault raised by environment or evaluator operations.
///
/// These never abort a run: they travel up to the nearest statement list,
/// are reported, and evaluation resumes with the next statement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("invalid type: expected {expected}, found {actual}")]
    InvalidType {
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("property '{property}' must be {expected}, found {actual}")]
    PropertyTypeMismatch {
        property: String,
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("number {0} is out of range")]
    NumberOutOfRange(f64),

    #[error("property '{0}' is read-only")]
    ReadOnlyProperty(String),

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("an object named '{0}' already exists")]
    ObjectAlreadyExists(String),

    #[error("undefined class: {0}")]
    UndefinedClass(String),

    #[error("class '{0}' is already defined")]
    ClassAlreadyExists(String),

    #[error("class '{0}' would inherit from itself")]
    InheritanceCycle(String),

    #[error("class '{class}' has no action '{action}'")]
    UndefinedAction { class: String, action: String },

    #[error("action '{action}' takes {expected} argument(s), got {actual}")]
    ArgumentCount {
        action: String,
        expected: usize,
        actual: usize,
    },

    #[error("step limit of {0} exceeded")]
    StepLimitExceeded(u64),
}

impl RuntimeError {
    pub fn invalid_type(expected: ValueKind, actual: ValueKind) -> Self {
        Self::InvalidType { expected, actual }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidType { .. } => ErrorCode::INVALID_TYPE,
            Self::PropertyTypeMismatch { .. } => ErrorCode::PROPERTY_TYPE_MISMATCH,
            Self::NumberOutOfRange(_) => ErrorCode::NUMBER_OUT_OF_RANGE,
            Self::ReadOnlyProperty(_) => ErrorCode::READ_ONLY_PROPERTY,
            Self::ObjectNotFound(_) => ErrorCode::OBJECT_NOT_FOUND,
            Self::ObjectAlreadyExists(_) => ErrorCode::OBJECT_ALREADY_EXISTS,
            Self::UndefinedClass(_) => ErrorCode::UNDEFINED_CLASS,
            Self::ClassAlreadyExists(_) => ErrorCode::CLASS_ALREADY_EXISTS,
            Self::InheritanceCycle(_) => ErrorCode::INHERITANCE_CYCLE,
            Self::UndefinedAction { .. } => ErrorCode::UNDEFINED_ACTION,
            Self::ArgumentCount { .. } => ErrorCode::WRONG_ARG_COUNT,
            Self::StepLimitExceeded(_) => ErrorCode::STEP_LIMIT_EXCEEDED,
        }
    }

    /// Attach the source location of the statement being evaluated.
    pub fn at(self, span: Span) -> ProgramError {
        ProgramError {
            line: span.line,
            error: self,
        }
    }
}

/// A [`RuntimeError`] tagged with the line it was raised on.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {error}")]
pub struct ProgramError {
    pub line: u32,
    #[source]
    pub error: RuntimeError,
}

impl From<&ProgramError> for Diagnostic {
    fn from(err: &ProgramError) -> Self {
        Diagnostic::new(err.error.code(), err.line, err.error.to_string())
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, ProgramError>;

/// Result alias for environment operations, which know nothing of lines.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
