//! Serializable view of the world after a tick.

use crate::env::Environment;
use crate::object::WordsObject;
use crate::value::{Position, Value};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSnapshot {
    /// Ticks completed so far.
    pub tick: u64,
    pub objects: Vec<ObjectSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectSnapshot {
    pub name: String,
    pub class: String,
    pub position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Display form of the last executed action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_action: Option<String>,
    pub queued: usize,
    /// Own properties only; class defaults are omitted.
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl WorldSnapshot {
    pub fn capture(env: &Environment, tick: u64) -> Self {
        let objects = env
            .objects()
            .map(|(_, object)| ObjectSnapshot::capture(env, object))
            .collect();
        Self { tick, objects }
    }

    pub fn object(&self, name: &str) -> Option<&ObjectSnapshot> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl ObjectSnapshot {
    fn capture(env: &Environment, object: &WordsObject) -> Self {
        Self {
            name: object.name().to_string(),
            class: env.classes().get(object.class()).name.clone(),
            position: object.position(),
            message: object.message().map(str::to_string),
            last_action: object.last_action().map(ToString::to_string),
            queued: object.queue().len(),
            properties: object
                .own_properties()
                .iter()
                .map(|(name, value)| (name.clone(), to_json(env, value)))
                .collect(),
        }
    }
}

/// Objects serialize by name; a stale reference becomes `null`.
fn to_json(env: &Environment, value: &Value) -> serde_json::Value {
    match value {
        Value::Number(n) => json!(n),
        Value::Text(s) => json!(s),
        Value::Boolean(b) => json!(b),
        Value::Object(id) => env
            .object(*id)
            .map_or(serde_json::Value::Null, |o| json!(o.name())),
        Value::Direction(d) => json!(d),
        Value::Position(p) => json!(p),
        Value::Absent => serde_json::Value::Null,
    }
}
