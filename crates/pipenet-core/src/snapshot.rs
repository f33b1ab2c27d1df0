//! Network snapshot and restore support.
//!
//! Provides [`NetworkSnapshot`] -- a serializable representation of the group
//! partition, including the slot table's generations and free list so that a
//! restored network hands out exactly the ids the original would have.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::group::PipeGroup;
use crate::network::PipeNetwork;
use crate::pos::GridPos;
use crate::slot::{GroupId, SlotTable, SlotTableState};
use crate::SnapshotError;

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// Serializable snapshot of a single group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    /// The group's id (index + generation).
    pub id: GroupId,
    /// Members in ascending coordinate order.
    pub members: Vec<GridPos>,
}

/// A complete, serializable snapshot of a [`PipeNetwork`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    /// Slot table bookkeeping (generations, free list).
    pub slots: SlotTableState,
    /// Every live group, in ascending slot order.
    pub groups: Vec<GroupSnapshot>,
}

// ---------------------------------------------------------------------------
// PipeNetwork snapshot/restore impl
// ---------------------------------------------------------------------------

impl PipeNetwork {
    /// Capture a deterministic snapshot of the network.
    pub fn capture_snapshot(&self) -> NetworkSnapshot {
        let groups = self
            .groups()
            .map(|(id, group)| GroupSnapshot {
                id,
                members: group.sorted_members(),
            })
            .collect();
        NetworkSnapshot {
            slots: self.slots().capture_state(),
            groups,
        }
    }

    /// Rebuild a network from a snapshot.
    ///
    /// Bounding boxes and cell markers are derived from the member lists.
    pub fn restore_from_snapshot(snapshot: &NetworkSnapshot) -> Result<Self, SnapshotError> {
        let mut cells: HashMap<GridPos, GroupId> = HashMap::new();
        let mut values = Vec::with_capacity(snapshot.groups.len());

        for captured in &snapshot.groups {
            if captured.members.is_empty() {
                return Err(SnapshotError::EmptyGroup { id: captured.id });
            }
            let mut group = PipeGroup::from_cells(captured.members.iter().copied());
            group.set_group_id(captured.id);
            for &pos in &captured.members {
                if cells.insert(pos, captured.id).is_some() {
                    return Err(SnapshotError::DuplicateCell { pos });
                }
            }
            values.push((captured.id, group));
        }

        let groups = SlotTable::restore_state(snapshot.slots.clone(), values)
            .ok_or(SnapshotError::InconsistentSlots)?;

        tracing::debug!(
            groups = groups.len(),
            cells = cells.len(),
            "pipe network restored from snapshot"
        );
        Ok(PipeNetwork::from_parts(groups, cells))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample() -> (HashSet<GridPos>, PipeNetwork) {
        let mut world = HashSet::new();
        let mut net = PipeNetwork::new();
        for pos in [
            GridPos::new(0, 0, 0),
            GridPos::new(1, 0, 0),
            GridPos::new(2, 0, 0),
            GridPos::new(9, 0, 0),
        ] {
            world.insert(pos);
            net.on_pipe_added(&world, pos).unwrap();
        }
        world.remove(&GridPos::new(1, 0, 0));
        net.on_pipe_removed(&world, GridPos::new(1, 0, 0)).unwrap();
        (world, net)
    }

    #[test]
    fn restore_reproduces_partition() {
        let (world, net) = sample();
        let snap = net.capture_snapshot();
        let restored = PipeNetwork::restore_from_snapshot(&snap).unwrap();
        assert_eq!(restored.capture_snapshot(), snap);
        assert_eq!(restored.group_count(), net.group_count());
        restored.check_invariants(&world).unwrap();
    }

    #[test]
    fn restored_network_allocates_same_ids() {
        let (mut world, mut net) = sample();
        let mut restored = PipeNetwork::restore_from_snapshot(&net.capture_snapshot()).unwrap();
        let pos = GridPos::new(20, 0, 0);
        world.insert(pos);
        assert_eq!(
            net.on_pipe_added(&world, pos).unwrap(),
            restored.on_pipe_added(&world, pos).unwrap()
        );
    }

    #[test]
    fn snapshot_json_roundtrip() {
        let (_, net) = sample();
        let snap = net.capture_snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let back: NetworkSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn duplicate_cell_is_rejected() {
        let (_, net) = sample();
        let mut snap = net.capture_snapshot();
        let stolen = snap.groups[0].members[0];
        snap.groups[1].members.push(stolen);
        assert_eq!(
            PipeNetwork::restore_from_snapshot(&snap).unwrap_err(),
            SnapshotError::DuplicateCell { pos: stolen }
        );
    }

    #[test]
    fn missing_group_is_rejected() {
        let (_, net) = sample();
        let mut snap = net.capture_snapshot();
        snap.groups.pop();
        assert_eq!(
            PipeNetwork::restore_from_snapshot(&snap).unwrap_err(),
            SnapshotError::InconsistentSlots
        );
    }
}
