//! Generational storage for live objects.
//!
//! An [`ObjectId`] stays valid only while the generation of its slot
//! matches; removing an object bumps the generation, so every id still
//! floating around in properties or scopes resolves to nothing.

use crate::object::WordsObject;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    object: Option<WordsObject>,
}

#[derive(Debug, Default)]
pub struct ObjectArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl ObjectArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: WordsObject) -> ObjectId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.object = Some(object);
            ObjectId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                object: Some(object),
            });
            ObjectId {
                index,
                generation: 0,
            }
        }
    }

    /// Take the object out and retire its id.
    pub fn remove(&mut self, id: ObjectId) -> Option<WordsObject> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let object = slot.object.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(object)
    }

    pub fn get(&self, id: ObjectId) -> Option<&WordsObject> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.object.as_ref())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut WordsObject> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.object.as_mut())
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    /// Ids of live objects in slot order.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &WordsObject)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.object.as_ref().map(|o| {
                (
                    ObjectId {
                        index: i as u32,
                        generation: s.generation,
                    },
                    o,
                )
            })
        })
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.object.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.object.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassId;
    use crate::value::Position;

    fn object(name: &str) -> WordsObject {
        WordsObject::new(name, ClassId(0), Position::default())
    }

    #[test]
    fn test_insert_and_get() {
        let mut arena = ObjectArena::new();
        let a = arena.insert(object("a"));
        let b = arena.insert(object("b"));
        assert_eq!(arena.get(a).map(|o| o.name()), Some("a"));
        assert_eq!(arena.get(b).map(|o| o.name()), Some("b"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_removed_id_is_stale_after_slot_reuse() {
        let mut arena = ObjectArena::new();
        let a = arena.insert(object("a"));
        assert!(arena.remove(a).is_some());
        assert!(arena.get(a).is_none());

        let c = arena.insert(object("c"));
        assert_ne!(a, c);
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(c).map(|o| o.name()), Some("c"));
        assert!(arena.remove(a).is_none());
    }

    #[test]
    fn test_iteration_follows_slot_order() {
        let mut arena = ObjectArena::new();
        let a = arena.insert(object("a"));
        let b = arena.insert(object("b"));
        let c = arena.insert(object("c"));
        arena.remove(b);
        assert_eq!(arena.ids(), vec![a, c]);
    }

    #[test]
    fn test_clear_retires_every_id() {
        let mut arena = ObjectArena::new();
        let a = arena.insert(object("a"));
        arena.clear();
        assert!(arena.is_empty());
        assert!(!arena.contains(a));
    }
}
