//! Stable-slot storage for half-edge entities
//!
//! Entities are only ever appended while a mesh is being edited. Removal
//! clears an entity's liveness flag (a tombstone); the slot keeps its place so
//! every id handed out earlier still names the same entity. Physical removal
//! happens in [`Arena::compact`], which renumbers the survivors and returns
//! the old-to-new table the owner uses to rewrite its cross references.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// A typed index into an [`Arena`].
pub trait EntityId: Copy + Eq + fmt::Debug {
    /// Sentinel that never names a slot
    const INVALID: Self;

    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;

    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

/// Entities that can be tombstoned in place.
pub trait Tombstone {
    fn is_alive(&self) -> bool;
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl EntityId for $name {
            const INVALID: Self = $name(u32::MAX);

            #[inline]
            fn from_index(index: usize) -> Self {
                debug_assert!(index < u32::MAX as usize);
                $name(index as u32)
            }

            #[inline]
            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!($prefix, "{}"), self.0)
                } else {
                    write!(f, concat!($prefix, "-"))
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }
    };
}

entity_id!(
    /// Handle to a vertex
    VertexId,
    "v"
);
entity_id!(
    /// Handle to an undirected edge
    EdgeId,
    "e"
);
entity_id!(
    /// Handle to a face
    FaceId,
    "f"
);
entity_id!(
    /// Handle to one directed side of an edge
    HalfEdgeId,
    "h"
);

/// Largest number of slots a single arena may hold.
pub const MAX_SLOTS: usize = u32::MAX as usize - 1;

/// Append-only vector of entities addressed by a typed id.
#[derive(Debug, Clone)]
pub struct Arena<I, T> {
    slots: Vec<T>,
    _id: PhantomData<fn() -> I>,
}

impl<I: EntityId, T: Tombstone> Arena<I, T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            _id: PhantomData,
        }
    }

    /// Store an entity and return its id
    pub fn push(&mut self, value: T) -> I {
        let id = I::from_index(self.slots.len());
        self.slots.push(value);
        id
    }

    pub fn get(&self, id: I) -> Option<&T> {
        self.slots.get(id.index())
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots.get_mut(id.index())
    }

    /// Whether `id` names a slot that has not been tombstoned
    pub fn is_alive(&self, id: I) -> bool {
        self.get(id).is_some_and(Tombstone::is_alive)
    }

    /// Number of slots, tombstones included
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of live entities
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_alive()).count()
    }

    /// Live entities with their ids, in slot order
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_alive())
            .map(|(i, s)| (I::from_index(i), s))
    }

    /// Ids of live entities, in slot order
    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        self.iter().map(|(id, _)| id)
    }

    /// Every slot mutably, tombstones included
    pub fn slots_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.slots.iter_mut()
    }

    /// Drop every tombstoned slot and renumber the survivors.
    ///
    /// Survivors keep their relative order. Every id obtained before this call
    /// is stale afterwards and must be passed through the returned [`Remap`].
    pub fn compact(&mut self) -> Remap<I> {
        let mut table = Vec::with_capacity(self.slots.len());
        let mut kept = 0usize;
        for slot in &self.slots {
            if slot.is_alive() {
                table.push(I::from_index(kept));
                kept += 1;
            } else {
                table.push(I::INVALID);
            }
        }
        self.slots.retain(Tombstone::is_alive);
        Remap { table }
    }
}

impl<I: EntityId, T: Tombstone> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: EntityId, T> Index<I> for Arena<I, T> {
    type Output = T;

    #[inline]
    fn index(&self, id: I) -> &T {
        &self.slots[id.index()]
    }
}

impl<I: EntityId, T> IndexMut<I> for Arena<I, T> {
    #[inline]
    fn index_mut(&mut self, id: I) -> &mut T {
        &mut self.slots[id.index()]
    }
}

/// Old-to-new id table produced by [`Arena::compact`].
#[derive(Debug, Clone)]
pub struct Remap<I> {
    table: Vec<I>,
}

impl<I: EntityId> Remap<I> {
    /// New id of `old`, or `I::INVALID` if it was removed
    pub fn get(&self, old: I) -> I {
        if !old.is_valid() {
            return I::INVALID;
        }
        self.table.get(old.index()).copied().unwrap_or(I::INVALID)
    }

    /// Whether any slot was dropped
    pub fn is_identity(&self) -> bool {
        self.table
            .iter()
            .enumerate()
            .all(|(i, id)| id.is_valid() && id.index() == i)
    }
}
