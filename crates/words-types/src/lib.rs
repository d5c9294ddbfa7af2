//! Shared types for the Words engine.
//!
//! This crate defines the AST handed over by the parser, source spans,
//! and the diagnostic records reported back to the host.

mod error;
mod span;
pub mod ast;

pub use error::{Diagnostic, Diagnostics, ErrorCategory, ErrorCode, MAX_ERRORS};
pub use span::{SourceFile, Span};
