//! Typed handles to engine objects
//!
//! Scripts never hold native object pointers. Each object a script can see
//! gets a slot in the [`HandleArena`]; the script holds an [`ObjHandle`]
//! (slot key + widget class). The engine owns the object itself, so a
//! handle can outlive it. Generational keys turn that into a
//! [`BindingError::StaleHandle`] instead of a dangling access.

use slotmap::{new_key_type, SlotMap};

use super::widgets::WidgetClass;
use crate::error::{BindingError, BindingResult};

new_key_type! {
    /// Arena slot of a script-visible object
    pub struct HandleKey;
}

/// Identity of an object inside the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeId(pub u64);

/// Script-side reference to an engine object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjHandle {
    key: HandleKey,
    class: WidgetClass,
}

impl ObjHandle {
    pub fn class(&self) -> WidgetClass {
        self.class
    }
}

#[derive(Debug)]
struct Slot {
    id: NativeId,
    class: WidgetClass,
}

/// Generational table of script-visible objects
#[derive(Debug, Default)]
pub struct HandleArena {
    slots: SlotMap<HandleKey, Slot>,
}

impl HandleArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a new handle for an engine object
    pub fn insert(&mut self, id: NativeId, class: WidgetClass) -> ObjHandle {
        let key = self.slots.insert(Slot { id, class });
        ObjHandle { key, class }
    }

    /// Existing handle for `id`, or a new one
    ///
    /// Used for objects the script did not create (the active screen).
    pub fn handle_for(&mut self, id: NativeId, class: WidgetClass) -> ObjHandle {
        let existing = self
            .slots
            .iter()
            .find(|(_, slot)| slot.id == id)
            .map(|(key, slot)| ObjHandle {
                key,
                class: slot.class,
            });
        existing.unwrap_or_else(|| self.insert(id, class))
    }

    /// Resolve a handle passed where a `expected` object is required
    ///
    /// Any widget is accepted where a base object is expected.
    pub fn resolve(&self, handle: ObjHandle, expected: WidgetClass) -> BindingResult<NativeId> {
        let slot = self.slots.get(handle.key).ok_or(BindingError::StaleHandle {
            class: handle.class.name(),
        })?;
        if expected != WidgetClass::Obj && slot.class != expected {
            return Err(BindingError::WrongClass {
                expected: expected.name(),
                actual: slot.class.name(),
            });
        }
        Ok(slot.id)
    }

    /// Invalidate a handle, returning the object it referred to
    pub fn remove(&mut self, handle: ObjHandle) -> BindingResult<NativeId> {
        self.slots
            .remove(handle.key)
            .map(|slot| slot.id)
            .ok_or(BindingError::StaleHandle {
                class: handle.class.name(),
            })
    }

    /// Invalidate every handle whose object no longer exists
    ///
    /// Deleting an object also deletes its children on the engine side.
    pub fn retain_live<F: FnMut(NativeId) -> bool>(&mut self, mut is_live: F) -> usize {
        let before = self.slots.len();
        self.slots.retain(|_, slot| is_live(slot.id));
        before - self.slots.len()
    }

    pub fn contains(&self, handle: ObjHandle) -> bool {
        self.slots.contains_key(handle.key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deleted_handle_is_stale() {
        let mut arena = HandleArena::new();
        let label = arena.insert(NativeId(7), WidgetClass::Label);
        assert_eq!(arena.resolve(label, WidgetClass::Label), Ok(NativeId(7)));

        assert_eq!(arena.remove(label), Ok(NativeId(7)));
        assert_eq!(
            arena.resolve(label, WidgetClass::Label),
            Err(BindingError::StaleHandle { class: "label" })
        );
        assert!(arena.remove(label).is_err());

        // A reused slot does not revive the old handle
        let other = arena.insert(NativeId(8), WidgetClass::Label);
        assert!(arena.resolve(label, WidgetClass::Label).is_err());
        assert_eq!(arena.resolve(other, WidgetClass::Label), Ok(NativeId(8)));
    }

    #[test]
    fn test_class_checks() {
        let mut arena = HandleArena::new();
        let slider = arena.insert(NativeId(1), WidgetClass::Slider);
        assert_eq!(arena.resolve(slider, WidgetClass::Obj), Ok(NativeId(1)));
        assert_eq!(
            arena.resolve(slider, WidgetClass::Label),
            Err(BindingError::WrongClass {
                expected: "label",
                actual: "slider"
            })
        );
    }

    #[test]
    fn test_handle_for_reuses_slot() {
        let mut arena = HandleArena::new();
        let a = arena.handle_for(NativeId(1), WidgetClass::Obj);
        let b = arena.handle_for(NativeId(1), WidgetClass::Obj);
        assert_eq!(a, b);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_retain_live_drops_dead_objects() {
        let mut arena = HandleArena::new();
        let parent = arena.insert(NativeId(1), WidgetClass::Obj);
        let child = arena.insert(NativeId(2), WidgetClass::Button);
        assert_eq!(arena.retain_live(|id| id != NativeId(2)), 1);
        assert!(arena.contains(parent));
        assert!(!arena.contains(child));
    }
}
