//! The pipe network manager.
//!
//! [`PipeNetwork`] owns every [`PipeGroup`] in a [`SlotTable`] and a marker per
//! tracked cell naming the group it belongs to. The host drives it with two
//! events:
//!
//! - [`on_pipe_added`](PipeNetwork::on_pipe_added): a lone pipe founds a new
//!   group, a pipe touching one group joins it, and a pipe touching several
//!   groups bridges them into one (re-derived by flood fill from the new cell
//!   over the bridged groups' cells).
//! - [`on_pipe_removed`](PipeNetwork::on_pipe_removed): the cell leaves its
//!   group; if two or more pipe neighbors survive, a probe flood fill checks
//!   whether they still reach each other, and if not the touched groups are
//!   dissolved and rebuilt from each surviving neighbor in face order.
//!
//! Both handlers run to completion and restore the invariants (every group is
//! one maximal connected component, every tracked cell is in exactly one
//! group) before returning.
//!
//! The world is injected per call through [`PipeGrid`], so independent
//! networks never share state.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::flood::{flood_fill, flood_fill_faces};
use crate::grid::PipeGrid;
use crate::group::PipeGroup;
use crate::pos::GridPos;
use crate::slot::{GroupId, SlotTable};
use crate::{InvariantViolation, NetworkError};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What a placement did to the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddOutcome {
    /// The cell was already tracked; nothing changed.
    AlreadyAssigned(GroupId),
    /// The cell had no neighboring group and now forms its own.
    Created(GroupId),
    /// The cell joined the single group it touches.
    Joined(GroupId),
    /// The cell bridged several groups; they were replaced by `into`.
    Merged {
        into: GroupId,
        absorbed: Vec<GroupId>,
    },
}

impl AddOutcome {
    /// The group holding the placed cell after the event.
    pub fn group(&self) -> GroupId {
        match self {
            AddOutcome::AlreadyAssigned(id)
            | AddOutcome::Created(id)
            | AddOutcome::Joined(id) => *id,
            AddOutcome::Merged { into, .. } => *into,
        }
    }
}

/// What a removal did to the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoveOutcome {
    /// The cell was the last member; its group no longer exists.
    Destroyed(GroupId),
    /// The cell left its group and fewer than two pipe neighbors remain.
    Shrunk(GroupId),
    /// Several pipe neighbors remain and they still reach each other.
    StillConnected(GroupId),
    /// The removal cut the component apart; `from` were dissolved and `into`
    /// were built in face order of the surviving neighbors.
    Split {
        from: Vec<GroupId>,
        into: Vec<GroupId>,
    },
}

// ---------------------------------------------------------------------------
// PipeNetwork
// ---------------------------------------------------------------------------

/// Incrementally maintained partition of pipe cells into connected groups.
#[derive(Debug, Clone, Default)]
pub struct PipeNetwork {
    groups: SlotTable<PipeGroup>,
    cells: HashMap<GridPos, GroupId>,
}

impl PipeNetwork {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        groups: SlotTable<PipeGroup>,
        cells: HashMap<GridPos, GroupId>,
    ) -> Self {
        Self { groups, cells }
    }

    // -- events -------------------------------------------------------------

    /// Handle a pipe placed at `pos`.
    ///
    /// Placing a pipe on a cell that is already tracked is a no-op that
    /// reports [`AddOutcome::AlreadyAssigned`].
    pub fn on_pipe_added<G>(&mut self, grid: &G, pos: GridPos) -> Result<AddOutcome, NetworkError>
    where
        G: PipeGrid + ?Sized,
    {
        if let Some(&id) = self.cells.get(&pos) {
            return Ok(AddOutcome::AlreadyAssigned(id));
        }
        if !grid.is_pipe(pos) {
            return Err(NetworkError::NotAPipe { pos });
        }

        let touching = self.neighbor_groups(grid, pos);
        match touching[..] {
            [] => {
                let id = self.insert_group(PipeGroup::from_cells([pos]));
                trace!(cell = %pos, group = %id, "pipe founded a new group");
                Ok(AddOutcome::Created(id))
            }
            [id] => {
                let group = self
                    .groups
                    .get_mut(id)
                    .ok_or(NetworkError::StaleGroup { pos, id })?;
                group.add_member(pos);
                self.cells.insert(pos, id);
                trace!(cell = %pos, group = %id, "pipe joined neighboring group");
                Ok(AddOutcome::Joined(id))
            }
            _ => {
                let mut pool = HashSet::from([pos]);
                for &id in &touching {
                    if let Some(group) = self.dissolve(id) {
                        pool.extend(group.members().iter().copied());
                    }
                }
                let into = self.build_group(pos, &mut pool);
                debug!(
                    cell = %pos,
                    group = %into,
                    absorbed = touching.len(),
                    members = self.groups.get(into).map_or(0, PipeGroup::len),
                    "bridge placement merged groups"
                );
                Ok(AddOutcome::Merged {
                    into,
                    absorbed: touching,
                })
            }
        }
    }

    /// Handle a pipe removed from `pos`.
    ///
    /// `pos` is treated as gone regardless of whether the host has already
    /// cleared the block.
    pub fn on_pipe_removed<G>(
        &mut self,
        grid: &G,
        pos: GridPos,
    ) -> Result<RemoveOutcome, NetworkError>
    where
        G: PipeGrid + ?Sized,
    {
        let id = *self.cells.get(&pos).ok_or(NetworkError::NotFound { pos })?;
        let group = self
            .groups
            .get_mut(id)
            .ok_or(NetworkError::StaleGroup { pos, id })?;

        group.remove_member(pos);
        self.cells.remove(&pos);
        if group.is_empty() {
            self.groups.remove(id);
            trace!(cell = %pos, group = %id, "last member removed, group destroyed");
            return Ok(RemoveOutcome::Destroyed(id));
        }

        let survivors: Vec<GridPos> = pos
            .neighbors()
            .map(|(_, next)| next)
            .filter(|&next| grid.is_pipe(next))
            .collect();
        if survivors.len() < 2 {
            trace!(cell = %pos, group = %id, "pipe removed from group");
            return Ok(RemoveOutcome::Shrunk(id));
        }

        let probe = flood_fill_faces(survivors[0], |p| group.contains(p));
        if survivors[1..].iter().all(|&next| probe.contains(next)) {
            trace!(
                cell = %pos,
                group = %id,
                probed = probe.len(),
                "pipe removed, group still connected"
            );
            return Ok(RemoveOutcome::StillConnected(id));
        }

        let mut from = Vec::new();
        for next in &survivors {
            if let Some(&touched) = self.cells.get(next) {
                if !from.contains(&touched) {
                    from.push(touched);
                }
            }
        }
        let mut pool = HashSet::new();
        for &touched in &from {
            if let Some(group) = self.dissolve(touched) {
                pool.extend(group.members().iter().copied());
            }
        }
        pool.remove(&pos);

        let mut into = Vec::new();
        for &next in &survivors {
            if pool.contains(&next) {
                into.push(self.build_group(next, &mut pool));
            }
        }
        // Cells cut off from every surviving neighbor only occur when the
        // partition was already out of step with the world.
        loop {
            let Some(seed) = pool.iter().min().copied() else {
                break;
            };
            into.push(self.build_group(seed, &mut pool));
        }

        debug!(
            cell = %pos,
            dissolved = from.len(),
            created = into.len(),
            "pipe removal split group"
        );
        Ok(RemoveOutcome::Split { from, into })
    }

    /// Drop all groups and re-register every cell in `cells`.
    ///
    /// This is the load path: the host reconstructs its pipe blocks, then
    /// replays a placement for each of them.
    pub fn rebuild<G, I>(&mut self, grid: &G, cells: I) -> Result<(), NetworkError>
    where
        G: PipeGrid + ?Sized,
        I: IntoIterator<Item = GridPos>,
    {
        self.clear();
        for pos in cells {
            self.on_pipe_added(grid, pos)?;
        }
        debug!(
            groups = self.group_count(),
            cells = self.cell_count(),
            "pipe network rebuilt"
        );
        Ok(())
    }

    /// Forget every group and cell.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.cells.clear();
    }

    // -- queries ------------------------------------------------------------

    /// The group a cell belongs to, if the cell is tracked.
    pub fn group_of(&self, pos: GridPos) -> Option<GroupId> {
        self.cells.get(&pos).copied()
    }

    /// The group a cell belongs to, resolved to the group itself.
    pub fn group_at(&self, pos: GridPos) -> Option<&PipeGroup> {
        self.group_of(pos).and_then(|id| self.groups.get(id))
    }

    /// Look up a group by id. Stale ids resolve to `None`.
    pub fn group(&self, id: GroupId) -> Option<&PipeGroup> {
        self.groups.get(id)
    }

    /// All live groups in ascending slot order.
    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &PipeGroup)> {
        self.groups.iter()
    }

    pub fn is_tracked(&self, pos: GridPos) -> bool {
        self.cells.contains_key(&pos)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn slots(&self) -> &SlotTable<PipeGroup> {
        &self.groups
    }

    // -- verification -------------------------------------------------------

    /// Verify the partition and connectivity invariants against `grid`.
    ///
    /// Returns the first violation found. Cost is linear in the number of
    /// tracked cells.
    pub fn check_invariants<G>(&self, grid: &G) -> Result<(), InvariantViolation>
    where
        G: PipeGrid + ?Sized,
    {
        for (id, group) in self.groups.iter() {
            if group.id() != Some(id) {
                return Err(InvariantViolation::IdMismatch {
                    slot: id,
                    stored: group.id(),
                });
            }
            let Some(&first) = group.members().iter().next() else {
                return Err(InvariantViolation::EmptyGroup { id });
            };

            for &pos in group.members() {
                if !grid.is_pipe(pos) {
                    return Err(InvariantViolation::MemberNotPipe { pos, id });
                }
                let found = self.cells.get(&pos).copied();
                if found != Some(id) {
                    return Err(InvariantViolation::MarkerMismatch { pos, id, found });
                }
                for (_, neighbor) in pos.neighbors() {
                    if !grid.is_pipe(neighbor) {
                        continue;
                    }
                    if let Some(&other) = self.cells.get(&neighbor) {
                        if other != id {
                            return Err(InvariantViolation::AdjacentGroups {
                                a: id,
                                b: other,
                                pos,
                                neighbor,
                            });
                        }
                    }
                }
            }

            let reached = flood_fill_faces(first, |p| group.contains(p)).len();
            if reached != group.len() {
                return Err(InvariantViolation::NotConnected {
                    id,
                    reached,
                    members: group.len(),
                });
            }
        }

        for (&pos, &id) in &self.cells {
            if !self.groups.get(id).is_some_and(|g| g.contains(pos)) {
                return Err(InvariantViolation::DanglingMarker { pos, id });
            }
        }
        Ok(())
    }

    // -- internals ----------------------------------------------------------

    /// Distinct groups of the pipe neighbors of `pos`, in face order.
    fn neighbor_groups<G>(&self, grid: &G, pos: GridPos) -> Vec<GroupId>
    where
        G: PipeGrid + ?Sized,
    {
        let mut found = Vec::with_capacity(6);
        for (_, next) in pos.neighbors() {
            if !grid.is_pipe(next) {
                continue;
            }
            if let Some(&id) = self.cells.get(&next) {
                if !found.contains(&id) {
                    found.push(id);
                }
            }
        }
        found
    }

    /// Store `group`, stamp its id and mark every member.
    fn insert_group(&mut self, group: PipeGroup) -> GroupId {
        let id = self.groups.add(group);
        if let Some(group) = self.groups.get_mut(id) {
            group.set_group_id(id);
            for &pos in group.members() {
                self.cells.insert(pos, id);
            }
        }
        id
    }

    /// Free a group's slot and clear the markers of its members.
    fn dissolve(&mut self, id: GroupId) -> Option<PipeGroup> {
        let group = self.groups.remove(id)?;
        for pos in group.members() {
            if self.cells.get(pos) == Some(&id) {
                self.cells.remove(pos);
            }
        }
        Some(group)
    }

    /// Flood from `seed` over the cells of `pool` and store the result as a
    /// new group. Claimed cells are taken out of `pool`.
    ///
    /// Only cells freed by dissolving groups are ever in `pool`, so pipes the
    /// host has not reported yet are never pulled into a group.
    fn build_group(&mut self, seed: GridPos, pool: &mut HashSet<GridPos>) -> GroupId {
        let mut group = PipeGroup::new();
        flood_fill(
            seed,
            |p| p.neighbors().map(|(_, next)| next),
            |p| pool.contains(&p),
            |p| {
                group.add_member(p);
            },
        );
        for pos in group.members() {
            pool.remove(pos);
        }
        self.insert_group(group)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
