//! Where recovered program errors go.

use words_types::{Diagnostic, Diagnostics};

/// Receives every program error recovered at a statement-list boundary.
///
/// The evaluator always keeps its own [`Diagnostics`] and logs through
/// `tracing`; a sink is for hosts that want the errors as they happen
/// (a console, a REPL prompt, an editor panel).
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: &Diagnostic);
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diagnostic: &Diagnostic) {
        self.push_error(diagnostic.clone());
    }
}

