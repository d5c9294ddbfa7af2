//! Property resolution and referer tracking.
//!
//! Lookup order for `get_property`: the computed properties (`row`,
//! `column`, `name`, `class`), the object's own table, then the class chain.
//! Anything else is `Absent`, never an error.

use crate::arena::ObjectId;
use crate::env::Environment;
use crate::error::{RuntimeError, RuntimeResult};
use crate::value::{Position, Value, ValueKind};
use tracing::trace;

impl Environment {
    pub fn get_property(&self, id: ObjectId, name: &str) -> Value {
        let Some(object) = self.object(id) else {
            return Value::Absent;
        };
        match name {
            "row" => return Value::Number(object.position().row as f64),
            "column" => return Value::Number(object.position().column as f64),
            "name" => return Value::Text(object.name().to_string()),
            "class" => return Value::Text(self.classes.get(object.class()).name.clone()),
            _ => {}
        }
        let found = object
            .own_property(name)
            .or_else(|| self.classes.property(object.class(), name));
        match found {
            Some(value) => self.live(value.clone()),
            None => Value::Absent,
        }
    }

    /// Write a property on a live object.
    ///
    /// `row`/`column` move the object and need a number that rounds onto
    /// the grid. `Absent` deletes
    /// the own entry. An object value registers `id` as a referer of its
    /// target first. Overwriting an object value with anything else leaves
    /// the old referer entry in place; invalidation skips slots that no
    /// longer point at the removed object.
    pub fn set_property(&mut self, id: ObjectId, name: &str, value: Value) -> RuntimeResult<()> {
        let value = self.live(value);
        let object = self
            .objects
            .get_mut(id)
            .ok_or_else(|| RuntimeError::ObjectNotFound(id.to_string()))?;

        match name {
            "row" | "column" => {
                let Value::Number(n) = value else {
                    return Err(RuntimeError::PropertyTypeMismatch {
                        property: name.to_string(),
                        expected: ValueKind::Number,
                        actual: value.kind(),
                    });
                };
                let coordinate =
                    Position::coordinate(n).ok_or(RuntimeError::NumberOutOfRange(n))?;
                let mut position = object.position();
                if name == "row" {
                    position.row = coordinate;
                } else {
                    position.column = coordinate;
                }
                object.set_position(position);
                return Ok(());
            }
            "name" | "class" => return Err(RuntimeError::ReadOnlyProperty(name.to_string())),
            _ => {}
        }

        match value {
            Value::Absent => {
                object.remove_property(name);
            }
            Value::Object(target) => {
                self.register_referer(target, id, name);
                if let Some(object) = self.objects.get_mut(id) {
                    object.insert_property(name, value);
                }
            }
            other => object.insert_property(name, other),
        }
        Ok(())
    }

    /// Record that `referer`'s property `property` points at `target`.
    pub fn register_referer(&mut self, target: ObjectId, referer: ObjectId, property: &str) {
        if let Some(target) = self.objects.get_mut(target) {
            target.add_referer(referer, property);
        }
    }

    /// Clear every property that still points at `target`, then forget the
    /// referer map. Runs once, when `target` is removed.
    pub fn invalidate_all_referers(&mut self, target: ObjectId) {
        let Some(object) = self.objects.get_mut(target) else {
            return;
        };
        for (referer, properties) in object.take_referers() {
            let Some(referer) = self.objects.get_mut(referer) else {
                continue;
            };
            for property in properties {
                if referer.own_property(&property) == Some(&Value::Object(target)) {
                    referer.remove_property(&property);
                    trace!(object = referer.name(), %property, "referer invalidated");
                }
            }
        }
    }
}
