//! Lexical scopes for alias bindings.

use crate::value::Value;
use std::collections::BTreeMap;

/// A single scope level.
#[derive(Debug, Clone, Default)]
struct Scope {
    bindings: BTreeMap<String, Value>,
}

/// The bindings visible at some point, flattened (inner shadows outer).
///
/// Queued actions carry one of these so expressions they evaluate later
/// still see the aliases of the block that queued them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturedScope {
    bindings: BTreeMap<String, Value>,
}

impl CapturedScope {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }
}

/// Scope stack with push/pop semantics.
///
/// Lookups go from the innermost scope outward. `bind` always writes to the
/// innermost scope. The outermost (global) scope is never popped.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn push(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Open a scope pre-filled with previously captured bindings.
    pub fn push_captured(&mut self, captured: &CapturedScope) {
        self.scopes.push(Scope {
            bindings: captured.bindings.clone(),
        });
    }

    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn bind(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.bindings.insert(name.to_string(), value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(name))
    }

    pub fn capture(&self) -> CapturedScope {
        let mut bindings = BTreeMap::new();
        for scope in &self.scopes {
            for (name, value) in &scope.bindings {
                bindings.insert(name.clone(), value.clone());
            }
        }
        CapturedScope { bindings }
    }

    /// Drop every scope and binding, leaving an empty global scope.
    pub fn reset(&mut self) {
        self.scopes = vec![Scope::default()];
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
