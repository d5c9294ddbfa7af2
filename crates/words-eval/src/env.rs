//! The live world: objects, classes, scopes and global listeners.

use crate::arena::{ObjectArena, ObjectId};
use crate::class::{ClassId, ClassRegistry, WordsClass};
use crate::error::{RuntimeError, RuntimeResult};
use crate::object::WordsObject;
use crate::scope::{CapturedScope, ScopeStack};
use crate::value::{Position, Value};
use std::collections::BTreeMap;
use tracing::debug;
use words_types::ast::ListenerDecl;

/// Sole owner of every object and class.
///
/// Objects refer to their class and to each other by id only; removing an
/// object invalidates every property that still points at it before its
/// slot is released.
#[derive(Debug, Default)]
pub struct Environment {
    pub(crate) objects: ObjectArena,
    names: BTreeMap<String, ObjectId>,
    pub(crate) classes: ClassRegistry,
    scopes: ScopeStack,
    listeners: Vec<ListenerDecl>,
    exited: bool,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    // ══════════════════════════════════════════════════════════════════════
    // Objects
    // ══════════════════════════════════════════════════════════════════════

    /// Create a named object of `class_name` at `position`, then apply the
    /// initial properties. If any property is rejected the object is
    /// discarded again.
    pub fn create_object(
        &mut self,
        name: &str,
        class_name: &str,
        initial_properties: Vec<(String, Value)>,
        position: Position,
    ) -> RuntimeResult<ObjectId> {
        if self.names.contains_key(name) {
            return Err(RuntimeError::ObjectAlreadyExists(name.to_string()));
        }
        let class = self
            .classes
            .id(class_name)
            .ok_or_else(|| RuntimeError::UndefinedClass(class_name.to_string()))?;

        let id = self.objects.insert(WordsObject::new(name, class, position));
        self.names.insert(name.to_string(), id);

        for (property, value) in initial_properties {
            if let Err(err) = self.set_property(id, &property, value) {
                self.remove(id);
                return Err(err);
            }
        }
        debug!(object = name, class = class_name, %position, "object created");
        Ok(id)
    }

    pub fn remove_object(&mut self, name: &str) -> RuntimeResult<()> {
        let id = self
            .get_object(name)
            .ok_or_else(|| RuntimeError::ObjectNotFound(name.to_string()))?;
        self.remove(id);
        Ok(())
    }

    /// Remove by id. Referers are invalidated before the slot is freed.
    /// Returns `false` if the id was already stale.
    pub fn remove(&mut self, id: ObjectId) -> bool {
        if !self.objects.contains(id) {
            return false;
        }
        self.invalidate_all_referers(id);
        match self.objects.remove(id) {
            Some(object) => {
                self.names.remove(object.name());
                debug!(object = object.name(), "object removed");
                true
            }
            None => false,
        }
    }

    pub fn get_object(&self, name: &str) -> Option<ObjectId> {
        self.names.get(name).copied()
    }

    pub fn object(&self, id: ObjectId) -> Option<&WordsObject> {
        self.objects.get(id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut WordsObject> {
        self.objects.get_mut(id)
    }

    pub fn is_live(&self, id: ObjectId) -> bool {
        self.objects.contains(id)
    }

    /// Live objects in arena order.
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.ids()
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &WordsObject)> {
        self.objects.iter()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Live objects whose class is `class_name` or inherits from it.
    /// An unknown class yields no objects.
    pub fn objects_by_class(&self, class_name: &str) -> Vec<ObjectId> {
        let Some(class) = self.classes.id(class_name) else {
            return Vec::new();
        };
        self.objects
            .iter()
            .filter(|(_, o)| self.classes.is_a(o.class(), class))
            .map(|(id, _)| id)
            .collect()
    }

    // ══════════════════════════════════════════════════════════════════════
    // Classes
    // ══════════════════════════════════════════════════════════════════════

    pub fn define_class(&mut self, class: WordsClass) -> RuntimeResult<ClassId> {
        let name = class.name.clone();
        let id = self.classes.define(class)?;
        debug!(class = %name, "class defined");
        Ok(id)
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn class_of(&self, id: ObjectId) -> Option<&WordsClass> {
        self.object(id).map(|o| self.classes.get(o.class()))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Scopes
    // ══════════════════════════════════════════════════════════════════════

    pub fn enter_scope(&mut self) {
        self.scopes.push();
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    pub(crate) fn enter_captured_scope(&mut self, captured: &CapturedScope) {
        self.scopes.push_captured(captured);
    }

    pub fn bind(&mut self, alias: &str, value: Value) {
        self.scopes.bind(alias, value);
    }

    /// Look up an alias. A binding to a removed object reads as `Absent`.
    pub fn lookup(&self, alias: &str) -> Option<Value> {
        self.scopes.get(alias).map(|v| self.live(v.clone()))
    }

    pub fn capture_scope(&self) -> CapturedScope {
        self.scopes.capture()
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    /// Replace a stale object reference by `Absent`.
    pub(crate) fn live(&self, value: Value) -> Value {
        match value {
            Value::Object(id) if !self.is_live(id) => Value::Absent,
            other => other,
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Listeners & lifecycle
    // ══════════════════════════════════════════════════════════════════════

    pub fn add_listener(&mut self, listener: ListenerDecl) {
        self.listeners.push(listener);
    }

    pub fn listeners(&self) -> &[ListenerDecl] {
        &self.listeners
    }

    pub(crate) fn remove_listener(&mut self, index: usize) -> ListenerDecl {
        self.listeners.remove(index)
    }

    /// Forget every object, class, listener and binding.
    pub fn reset(&mut self) {
        self.objects.clear();
        self.names.clear();
        self.classes.clear();
        self.scopes.reset();
        self.listeners.clear();
        debug!("environment reset");
    }

    pub fn exit(&mut self) {
        self.exited = true;
    }

    pub fn exited(&self) -> bool {
        self.exited
    }
}
