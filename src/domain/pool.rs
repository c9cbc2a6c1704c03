/// Entity pool: arena of slots + free list, one pool per entity kind.
///
/// Every transient entity (enemy actors, projectiles, wall/hole fixtures)
/// lives in a `Pool<T>` and is addressed by a `Handle<T>`:
///
///   - `acquire(value)` reuses the most recently released slot if any,
///     otherwise grows the arena.
///   - `release(handle)` moves the slot to the free list.
///
/// A handle carries the slot generation it was issued for. Once released,
/// lookups through that handle return `None`, and the slot can be handed
/// out again under a new generation, so stale handles never alias a live
/// entity.
///
/// Releasing a handle that is not active is model corruption and panics.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Stable reference to a pooled entity.
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: u32, generation: u32) -> Self {
        Handle { index, generation, _kind: PhantomData }
    }

    /// Slot index inside the pool (reused across generations).
    pub fn index(self) -> usize {
        self.index as usize
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

// Manual impls: derive would require `T: Clone` etc.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self { *self }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Pool::new()
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Pool { slots: Vec::new(), free: Vec::new() }
    }

    /// Activate `value`, reusing a released slot when one exists.
    pub fn acquire(&mut self, value: T) -> Handle<T> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.value.is_none(), "free list holds an active slot");
            slot.generation = slot.generation.wrapping_add(1);
            slot.value = Some(value);
            return Handle::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, value: Some(value) });
        Handle::new(index, 0)
    }

    /// Deactivate `handle` and return its value.
    ///
    /// Panics if the handle is stale or already released.
    pub fn release(&mut self, handle: Handle<T>) -> T {
        let slot = self.slots.get_mut(handle.index());
        let value = match slot {
            Some(slot) if slot.generation == handle.generation => slot.value.take(),
            _ => None,
        };
        match value {
            Some(v) => {
                self.free.push(handle.index);
                v
            }
            None => panic!("pool: release of inactive handle {handle:?}"),
        }
    }

    pub fn is_active(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.slots
            .get(handle.index())
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index())
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.value.as_mut())
    }

    /// Number of active entities.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Number of released slots waiting for reuse.
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Snapshot of active handles. Safe to hold while mutating the pool.
    pub fn handles(&self) -> Vec<Handle<T>> {
        self.iter().map(|(h, _)| h).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.value.as_ref().map(|v| (Handle::new(i as u32, s.generation), v))
        })
    }
}
