use serde::{Deserialize, Serialize};
use std::fmt;

/// Source location of an AST node.
///
/// Line and column are 1-based. The parser fills in whatever it knows;
/// the engine itself only ever reports `line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    /// Create a new span.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Span covering the start of a line, for nodes whose column is unknown.
    pub fn line(line: u32) -> Self {
        Self::new(line, 1)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Script source kept around so diagnostics can quote the failing line.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    lines: Vec<String>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, source: &str) -> Self {
        Self {
            name: name.into(),
            lines: source
                .split('\n')
                .map(|l| l.trim_end_matches('\r').to_string())
                .collect(),
        }
    }

    /// Text of a 1-based line, or `None` when out of range.
    pub fn line(&self, line_number: u32) -> Option<&str> {
        let idx = line_number.checked_sub(1)? as usize;
        self.lines.get(idx).map(String::as_str)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}
