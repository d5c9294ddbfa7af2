//! Class definitions and the single-parent inheritance chain.

use crate::error::{RuntimeError, RuntimeResult};
use crate::value::Value;
use std::collections::BTreeMap;
use words_types::ast::{ActionDef, ListenerDecl};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(pub(crate) usize);

/// A class after its body has been evaluated. Immutable once registered.
#[derive(Debug, Clone)]
pub struct WordsClass {
    pub name: String,
    pub parent: Option<ClassId>,
    pub properties: BTreeMap<String, Value>,
    pub actions: BTreeMap<String, ActionDef>,
    pub listeners: Vec<ListenerDecl>,
}

impl WordsClass {
    pub fn new(name: impl Into<String>, parent: Option<ClassId>) -> Self {
        Self {
            name: name.into(),
            parent,
            properties: BTreeMap::new(),
            actions: BTreeMap::new(),
            listeners: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: Vec<WordsClass>,
    by_name: BTreeMap<String, ClassId>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: ClassId) -> &WordsClass {
        &self.classes[id.0]
    }

    pub fn by_name(&self, name: &str) -> Option<&WordsClass> {
        self.id(name).map(|id| self.get(id))
    }

    /// Resolve a parent name, rejecting self-inheritance and unknown classes.
    pub fn resolve_parent(&self, name: &str, parent: Option<&str>) -> RuntimeResult<Option<ClassId>> {
        let Some(parent) = parent else {
            return Ok(None);
        };
        if parent == name {
            return Err(RuntimeError::InheritanceCycle(name.to_string()));
        }
        let id = self
            .id(parent)
            .ok_or_else(|| RuntimeError::UndefinedClass(parent.to_string()))?;
        if self.chain(id).any(|c| c.name == name) {
            return Err(RuntimeError::InheritanceCycle(name.to_string()));
        }
        Ok(Some(id))
    }

    pub fn define(&mut self, class: WordsClass) -> RuntimeResult<ClassId> {
        if self.by_name.contains_key(&class.name) {
            return Err(RuntimeError::ClassAlreadyExists(class.name));
        }
        let parent_name = class.parent.map(|p| self.get(p).name.clone());
        self.resolve_parent(&class.name, parent_name.as_deref())?;

        let id = ClassId(self.classes.len());
        self.by_name.insert(class.name.clone(), id);
        self.classes.push(class);
        Ok(id)
    }

    /// The class itself, then each ancestor.
    pub fn chain(&self, id: ClassId) -> impl Iterator<Item = &WordsClass> {
        std::iter::successors(Some(self.get(id)), move |c| c.parent.map(|p| self.get(p)))
    }

    pub fn chain_ids(&self, id: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        std::iter::successors(Some(id), move |c| self.get(*c).parent)
    }

    /// Whether `id` is `ancestor` or inherits from it.
    pub fn is_a(&self, id: ClassId, ancestor: ClassId) -> bool {
        self.chain_ids(id).any(|c| c == ancestor)
    }

    /// Default property lookup up the chain.
    pub fn property(&self, id: ClassId, name: &str) -> Option<&Value> {
        self.chain(id).find_map(|c| c.properties.get(name))
    }

    /// Custom action lookup up the chain; the nearest definition wins.
    pub fn action(&self, id: ClassId, name: &str) -> Option<&ActionDef> {
        self.chain(id).find_map(|c| c.actions.get(name))
    }

    pub fn clear(&mut self) {
        self.classes.clear();
        self.by_name.clear();
    }
}
