//! A single connected component of pipe cells.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::pos::GridPos;
use crate::slot::GroupId;

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// Inclusive axis-aligned box over grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub min: GridPos,
    pub max: GridPos,
}

impl Bounds {
    /// A box containing exactly one cell.
    pub fn point(pos: GridPos) -> Self {
        Self { min: pos, max: pos }
    }

    /// Grow the box to include `pos`.
    pub fn include(&mut self, pos: GridPos) {
        self.min = self.min.min(pos);
        self.max = self.max.max(pos);
    }

    /// Smallest box around `cells`, or `None` if there are none.
    pub fn enclosing(cells: impl IntoIterator<Item = GridPos>) -> Option<Self> {
        let mut iter = cells.into_iter();
        let mut bounds = Bounds::point(iter.next()?);
        for pos in iter {
            bounds.include(pos);
        }
        Some(bounds)
    }

    /// Returns `true` if any coordinate of `pos` equals the matching min or max.
    pub fn is_on_face(&self, pos: GridPos) -> bool {
        pos.x == self.min.x
            || pos.x == self.max.x
            || pos.y == self.min.y
            || pos.y == self.max.y
            || pos.z == self.min.z
            || pos.z == self.max.z
    }
}

// ---------------------------------------------------------------------------
// PipeGroup
// ---------------------------------------------------------------------------

/// One maximal connected set of pipe cells.
///
/// The bounding box grows cheaply on every [`add_member`](Self::add_member)
/// and is only rescanned when a removed member sat on one of its faces.
#[derive(Debug, Clone, Default)]
pub struct PipeGroup {
    id: Option<GroupId>,
    members: HashSet<GridPos>,
    bounds: Option<Bounds>,
}

impl PipeGroup {
    /// Create an empty group with no id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group from an initial set of cells.
    pub fn from_cells(cells: impl IntoIterator<Item = GridPos>) -> Self {
        let mut group = Self::new();
        for pos in cells {
            group.add_member(pos);
        }
        group
    }

    /// The group's id, once the owning table has assigned one.
    pub fn id(&self) -> Option<GroupId> {
        self.id
    }

    /// Assign the group's id. Only the first call has any effect.
    pub fn set_group_id(&mut self, id: GroupId) {
        if self.id.is_none() {
            self.id = Some(id);
        }
    }

    /// Insert `pos`, growing the bounding box if needed.
    ///
    /// Returns `false` if `pos` was already a member.
    pub fn add_member(&mut self, pos: GridPos) -> bool {
        if !self.members.insert(pos) {
            return false;
        }
        match &mut self.bounds {
            Some(bounds) => bounds.include(pos),
            None => self.bounds = Some(Bounds::point(pos)),
        }
        true
    }

    /// Remove `pos`, rescanning the bounding box if `pos` touched its edge.
    ///
    /// Returns `false` if `pos` was not a member.
    pub fn remove_member(&mut self, pos: GridPos) -> bool {
        if !self.members.remove(&pos) {
            return false;
        }
        if self.is_touching_edge(pos) {
            self.bounds = Bounds::enclosing(self.members.iter().copied());
        }
        true
    }

    /// Returns `true` if `pos` shares any coordinate with a face of the box.
    pub fn is_touching_edge(&self, pos: GridPos) -> bool {
        self.bounds.is_some_and(|b| b.is_on_face(pos))
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.members.contains(&pos)
    }

    pub fn members(&self) -> &HashSet<GridPos> {
        &self.members
    }

    /// Members in ascending coordinate order.
    pub fn sorted_members(&self) -> Vec<GridPos> {
        let mut cells: Vec<GridPos> = self.members.iter().copied().collect();
        cells.sort_unstable();
        cells
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn min_bound(&self) -> Option<GridPos> {
        self.bounds.map(|b| b.min)
    }

    pub fn max_bound(&self) -> Option<GridPos> {
        self.bounds.map(|b| b.max)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
