//! A scripted object: identity, position, own properties and action queue.

use crate::action::Action;
use crate::arena::ObjectId;
use crate::class::ClassId;
use crate::value::{Position, Value};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Identifies a class-level listener: the declaring class and its index there.
pub type ListenerKey = (ClassId, usize);

#[derive(Debug, Clone)]
pub struct WordsObject {
    name: String,
    class: ClassId,
    position: Position,
    properties: BTreeMap<String, Value>,
    queue: VecDeque<Action>,
    last_action: Option<Action>,
    message: Option<String>,
    /// Objects holding Object-typed properties that point here, and which
    /// of their properties do.
    referers: BTreeMap<ObjectId, Vec<String>>,
    /// Temporary class listeners that already fired for this object.
    spent_listeners: BTreeSet<ListenerKey>,
}

impl WordsObject {
    pub fn new(name: impl Into<String>, class: ClassId, position: Position) -> Self {
        Self {
            name: name.into(),
            class,
            position,
            properties: BTreeMap::new(),
            queue: VecDeque::new(),
            last_action: None,
            message: None,
            referers: BTreeMap::new(),
            spent_listeners: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn last_action(&self) -> Option<&Action> {
        self.last_action.as_ref()
    }

    pub(crate) fn set_last_action(&mut self, action: Action) {
        self.last_action = Some(action);
    }

    // ── Queue ────────────────────────────────────────────────────────────

    pub fn enqueue_action(&mut self, action: Action) {
        self.queue.push_back(action);
    }

    pub fn enqueue_action_at_front(&mut self, action: Action) {
        self.queue.push_front(action);
    }

    pub fn queue(&self) -> &VecDeque<Action> {
        &self.queue
    }

    pub fn clear_action_queue(&mut self) {
        self.queue.clear();
    }

    pub(crate) fn pop_action(&mut self) -> Option<Action> {
        self.queue.pop_front()
    }

    pub(crate) fn head_is_expandable(&self) -> bool {
        self.queue.front().is_some_and(Action::is_expandable)
    }

    /// Put `actions` back at the head of the queue, preserving their order.
    pub(crate) fn splice_front(&mut self, actions: VecDeque<Action>) {
        for action in actions.into_iter().rev() {
            self.queue.push_front(action);
        }
    }

    // ── Own properties ───────────────────────────────────────────────────

    /// Own property only, ignoring the class chain.
    pub fn own_property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn own_properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    pub(crate) fn insert_property(&mut self, name: &str, value: Value) {
        self.properties.insert(name.to_string(), value);
    }

    pub(crate) fn remove_property(&mut self, name: &str) -> Option<Value> {
        self.properties.remove(name)
    }

    // ── Referers ─────────────────────────────────────────────────────────

    /// Objects that have stored this one in a property, by property name.
    /// Entries are only dropped when this object is removed, so stale ones
    /// from overwritten slots or removed holders accumulate until then.
    pub fn referers(&self) -> &BTreeMap<ObjectId, Vec<String>> {
        &self.referers
    }

    pub(crate) fn add_referer(&mut self, referer: ObjectId, property: &str) {
        let props = self.referers.entry(referer).or_default();
        if !props.iter().any(|p| p == property) {
            props.push(property.to_string());
        }
    }

    pub(crate) fn take_referers(&mut self) -> BTreeMap<ObjectId, Vec<String>> {
        std::mem::take(&mut self.referers)
    }

    // ── Listeners ────────────────────────────────────────────────────────

    pub(crate) fn listener_spent(&self, key: ListenerKey) -> bool {
        self.spent_listeners.contains(&key)
    }

    pub(crate) fn spend_listener(&mut self, key: ListenerKey) {
        self.spent_listeners.insert(key);
    }
}
