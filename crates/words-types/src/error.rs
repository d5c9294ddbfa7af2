use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of diagnostics stored before further ones are only counted.
pub const MAX_ERRORS: usize = 20;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Type,
    Name,
    Class,
    Action,
    Limit,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type => write!(f, "type"),
            Self::Name => write!(f, "name"),
            Self::Class => write!(f, "class"),
            Self::Action => write!(f, "action"),
            Self::Limit => write!(f, "limit"),
        }
    }
}

/// Numeric runtime error code (E100–E599).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Type errors (E100–E199) ──
    pub const INVALID_TYPE: Self = Self(100);
    pub const PROPERTY_TYPE_MISMATCH: Self = Self(101);
    pub const READ_ONLY_PROPERTY: Self = Self(102);
    pub const NUMBER_OUT_OF_RANGE: Self = Self(103);

    // ── Name errors (E200–E299) ──
    pub const OBJECT_NOT_FOUND: Self = Self(200);
    pub const OBJECT_ALREADY_EXISTS: Self = Self(201);

    // ── Class errors (E300–E399) ──
    pub const UNDEFINED_CLASS: Self = Self(300);
    pub const CLASS_ALREADY_EXISTS: Self = Self(301);
    pub const INHERITANCE_CYCLE: Self = Self(302);

    // ── Action errors (E400–E499) ──
    pub const UNDEFINED_ACTION: Self = Self(400);
    pub const WRONG_ARG_COUNT: Self = Self(401);

    // ── Limit errors (E500–E599) ──
    pub const STEP_LIMIT_EXCEEDED: Self = Self(500);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Type,
            200..=299 => ErrorCategory::Name,
            300..=399 => ErrorCategory::Class,
            400..=499 => ErrorCategory::Action,
            _ => ErrorCategory::Limit,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A recovered program error, as handed to the diagnostic sink.
///
/// The UI layer renders these; it must not parse free-form strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub category: ErrorCategory,
    /// Line of the statement that raised the error.
    pub line: u32,
    pub message: String,
    /// The exact source line, when the evaluator was given the source text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
}

impl Diagnostic {
    pub fn new(code: ErrorCode, line: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            category: code.category(),
            line,
            message: message.into(),
            source_line: None,
        }
    }

    pub fn with_source_line(mut self, source_line: impl Into<String>) -> Self {
        self.source_line = Some(source_line.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {} [{}] {}",
            self.line, self.code, self.category, self.message
        )
    }
}

/// Collected diagnostics for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub errors: Vec<Diagnostic>,
    pub total_errors: usize,
}

impl Diagnostics {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Add an error, respecting the MAX_ERRORS limit.
    pub fn push_error(&mut self, error: Diagnostic) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    pub fn clear(&mut self) {
        self.errors.clear();
        self.total_errors = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::INVALID_TYPE.category(), ErrorCategory::Type);
        assert_eq!(ErrorCode::OBJECT_NOT_FOUND.category(), ErrorCategory::Name);
        assert_eq!(ErrorCode::INHERITANCE_CYCLE.category(), ErrorCategory::Class);
        assert_eq!(ErrorCode::UNDEFINED_ACTION.category(), ErrorCategory::Action);
        assert_eq!(
            ErrorCode::STEP_LIMIT_EXCEEDED.category(),
            ErrorCategory::Limit
        );
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::new(ErrorCode::OBJECT_NOT_FOUND, 7, "object not found: ghost");
        assert_eq!(
            d.to_string(),
            "line 7: E200 [name] object not found: ghost"
        );
    }

    #[test]
    fn test_diagnostic_json_skips_missing_source_line() {
        let d = Diagnostic::new(ErrorCode::INVALID_TYPE, 2, "bad");
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"line\":2"));
        assert!(json.contains("\"category\":\"type\""));
        assert!(!json.contains("source_line"));

        let quoted = d.with_source_line("w1 moves up \"far\"");
        let json = serde_json::to_string(&quoted).unwrap();
        assert!(json.contains("\"source_line\""));
    }

    #[test]
    fn test_diagnostics_max_limit() {
        let mut diags = Diagnostics::empty();
        for i in 0..25 {
            diags.push_error(Diagnostic::new(
                ErrorCode::OBJECT_NOT_FOUND,
                i + 1,
                format!("error {i}"),
            ));
        }
        assert_eq!(diags.errors.len(), MAX_ERRORS);
        assert_eq!(diags.total_errors, 25);
        assert!(diags.has_errors());

        diags.clear();
        assert!(!diags.has_errors());
        assert!(diags.errors.is_empty());
    }
}
