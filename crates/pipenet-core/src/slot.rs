//! Group identifiers and the recycling slot table that owns group values.
//!
//! A [`GroupId`] is a 64-bit handle that packs a *generation* counter in the
//! high 32 bits and a slot *index* in the low 32 bits. Freed indices are reused
//! in FIFO order, and the generation is bumped every time a slot is freed, so a
//! handle kept across a destroy/recreate boundary is detected as stale instead
//! of silently resolving to the new occupant.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::ops::{Index, IndexMut};

// ---------------------------------------------------------------------------
// GroupId
// ---------------------------------------------------------------------------

/// A generational group identifier.
///
/// Layout: `[generation: u32 | index: u32]`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(u64);

impl GroupId {
    /// Construct a `GroupId` from an index and generation.
    #[inline]
    pub fn new(index: u32, generation: u32) -> Self {
        Self((generation as u64) << 32 | index as u64)
    }

    /// The slot index (low 32 bits).
    #[inline]
    pub fn index(self) -> u32 {
        self.0 as u32
    }

    /// The generation (high 32 bits).
    #[inline]
    pub fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Raw `u64` representation.
    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }

    /// Reconstruct from a raw `u64`.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupId({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

// ---------------------------------------------------------------------------
// SlotTableState
// ---------------------------------------------------------------------------

/// Allocation bookkeeping of a [`SlotTable`], without the stored values.
///
/// Captured into network snapshots so that ids handed out after a restore are
/// identical to the ids the original table would have produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotTableState {
    /// Per-index generation counters.
    pub generations: Vec<u32>,
    /// Free-list indices (in FIFO order).
    pub free_indices: Vec<u32>,
}

// ---------------------------------------------------------------------------
// SlotTable
// ---------------------------------------------------------------------------

/// An id -> value table with O(1) insertion and removal.
///
/// Free indices are kept in a FIFO queue so that generations are spread out
/// over time rather than concentrated on a hot index.
#[derive(Debug, Clone)]
pub struct SlotTable<T> {
    /// Occupant of each slot; `None` when free.
    slots: Vec<Option<T>>,
    /// Current generation for each slot.
    generations: Vec<u32>,
    /// Free-list of recyclable indices (FIFO queue).
    free_indices: VecDeque<u32>,
    /// Number of occupied slots.
    len: usize,
}

impl<T> SlotTable<T> {
    /// Create a new, empty table.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_indices: VecDeque::new(),
            len: 0,
        }
    }

    /// Store `value` and return its id.
    ///
    /// The oldest freed index is reused if one exists (its generation was
    /// already bumped on removal); otherwise the backing store grows by one.
    pub fn add(&mut self, value: T) -> GroupId {
        self.len += 1;
        if let Some(index) = self.free_indices.pop_front() {
            self.slots[index as usize] = Some(value);
            GroupId::new(index, self.generations[index as usize])
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Some(value));
            self.generations.push(0);
            GroupId::new(index, 0)
        }
    }

    /// Free the slot behind `id` and return its value.
    ///
    /// Returns `None` if `id` is stale, already freed, or was never allocated.
    /// In that case the free list is left untouched.
    pub fn remove(&mut self, id: GroupId) -> Option<T> {
        if !self.is_alive(id) {
            return None;
        }
        let idx = id.index() as usize;
        let value = self.slots[idx].take();
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_indices.push_back(id.index());
        self.len -= 1;
        value
    }

    /// Returns `true` if `id` refers to an occupied slot of the same generation.
    pub fn is_alive(&self, id: GroupId) -> bool {
        let idx = id.index() as usize;
        idx < self.slots.len()
            && self.generations[idx] == id.generation()
            && self.slots[idx].is_some()
    }

    /// Look up the value behind `id`, or `None` if the id is not alive.
    pub fn get(&self, id: GroupId) -> Option<&T> {
        if !self.is_alive(id) {
            return None;
        }
        self.slots[id.index() as usize].as_ref()
    }

    /// Mutable lookup, or `None` if the id is not alive.
    pub fn get_mut(&mut self, id: GroupId) -> Option<&mut T> {
        if !self.is_alive(id) {
            return None;
        }
        self.slots[id.index() as usize].as_mut()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate occupied slots in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (GroupId, &T)> {
        self.slots
            .iter()
            .zip(self.generations.iter())
            .enumerate()
            .filter_map(|(index, (slot, &generation))| {
                slot.as_ref()
                    .map(|value| (GroupId::new(index as u32, generation), value))
            })
    }

    /// Remove every value and forget all allocation history.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.generations.clear();
        self.free_indices.clear();
        self.len = 0;
    }

    /// Capture the allocation bookkeeping for snapshot/restore.
    pub fn capture_state(&self) -> SlotTableState {
        SlotTableState {
            generations: self.generations.clone(),
            free_indices: self.free_indices.iter().copied().collect(),
        }
    }

    /// Rebuild a table from captured bookkeeping and the live values.
    ///
    /// Every slot not on the free list must be provided in `values`; returns
    /// `None` if a value's id does not match the captured generations, if a
    /// value targets a free slot, or if an occupied slot is left without a
    /// value.
    pub fn restore_state(
        state: SlotTableState,
        values: impl IntoIterator<Item = (GroupId, T)>,
    ) -> Option<Self> {
        let capacity = state.generations.len();
        let mut slots: Vec<Option<T>> = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        let mut free = vec![false; capacity];
        for &index in &state.free_indices {
            *free.get_mut(index as usize)? = true;
        }

        let mut len = 0;
        for (id, value) in values {
            let idx = id.index() as usize;
            if idx >= capacity
                || free[idx]
                || state.generations[idx] != id.generation()
                || slots[idx].is_some()
            {
                return None;
            }
            slots[idx] = Some(value);
            len += 1;
        }

        if len + state.free_indices.len() != capacity {
            return None;
        }

        Some(Self {
            slots,
            generations: state.generations,
            free_indices: VecDeque::from(state.free_indices),
            len,
        })
    }
}

impl<T> Default for SlotTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<GroupId> for SlotTable<T> {
    type Output = T;

    /// Direct lookup. Panics if `id` is stale or was never allocated.
    fn index(&self, id: GroupId) -> &T {
        match self.get(id) {
            Some(value) => value,
            None => panic!("slot table lookup with dead id {id:?}"),
        }
    }
}

impl<T> IndexMut<GroupId> for SlotTable<T> {
    fn index_mut(&mut self, id: GroupId) -> &mut T {
        match self.get_mut(id) {
            Some(value) => value,
            None => panic!("slot table lookup with dead id {id:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
