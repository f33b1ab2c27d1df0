//! Pipenet core -- incremental connected-component tracking for pipe grids.
//!
//! Pipe blocks live on an integer 3D grid and connect across the six faces of
//! a cell. The [`PipeNetwork`](network::PipeNetwork) keeps every maximal
//! connected set of pipes in its own [`PipeGroup`](group::PipeGroup), updating
//! the partition incrementally as the host reports placements and removals:
//! joining an existing group is O(1), bridging groups or cutting one apart
//! re-derives the affected components with a flood fill.
//!
//! # Quick Start
//!
//! ```
//! use std::collections::HashSet;
//! use pipenet_core::prelude::*;
//!
//! let mut world: HashSet<GridPos> = HashSet::new();
//! let mut network = PipeNetwork::new();
//!
//! for x in 0..5 {
//!     let pos = GridPos::new(x, 0, 0);
//!     world.insert(pos);
//!     network.on_pipe_added(&world, pos).unwrap();
//! }
//! assert_eq!(network.group_count(), 1);
//!
//! // Cutting the middle pipe splits the line in two.
//! let middle = GridPos::new(2, 0, 0);
//! world.remove(&middle);
//! network.on_pipe_removed(&world, middle).unwrap();
//! assert_eq!(network.group_count(), 2);
//! ```

#![deny(unsafe_code)]

pub mod flood;
pub mod grid;
pub mod group;
pub mod highlight;
pub mod network;
pub mod pos;
pub mod slot;
pub mod snapshot;

use pos::GridPos;
use slot::GroupId;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Precondition violations reported by [`PipeNetwork`](network::PipeNetwork)
/// event handlers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// A placement was reported for a cell the world does not consider a pipe.
    #[error("cell {pos} is not a connectable pipe")]
    NotAPipe { pos: GridPos },

    /// A removal was reported for a cell the network is not tracking.
    #[error("cell {pos} is not tracked by any pipe group")]
    NotFound { pos: GridPos },

    /// A tracked cell points at a group that no longer exists.
    #[error("cell {pos} refers to group {id} which is stale or was never allocated")]
    StaleGroup { pos: GridPos, id: GroupId },
}

/// A breach of the network's structural invariants, reported by
/// [`PipeNetwork::check_invariants`](network::PipeNetwork::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// A live group has no members.
    #[error("group {id} is empty")]
    EmptyGroup { id: GroupId },

    /// A group's stored id differs from the slot it occupies.
    #[error("group stored at {slot} carries id {stored:?}")]
    IdMismatch { slot: GroupId, stored: Option<GroupId> },

    /// A group member is no longer a pipe in the world.
    #[error("member {pos} of group {id} is not a pipe")]
    MemberNotPipe { pos: GridPos, id: GroupId },

    /// A member's cell marker does not point back at its group.
    #[error("member {pos} of group {id} is marked as {found:?}")]
    MarkerMismatch {
        pos: GridPos,
        id: GroupId,
        found: Option<GroupId>,
    },

    /// A cell marker points at a group that does not contain the cell.
    #[error("cell {pos} is marked as {id} but that group does not contain it")]
    DanglingMarker { pos: GridPos, id: GroupId },

    /// A group's members do not form a single connected component.
    #[error("group {id} is not connected: {reached} of {members} members reachable")]
    NotConnected {
        id: GroupId,
        reached: usize,
        members: usize,
    },

    /// Two distinct groups own face-adjacent pipe cells.
    #[error("groups {a} and {b} touch at {pos} -> {neighbor}")]
    AdjacentGroups {
        a: GroupId,
        b: GroupId,
        pos: GridPos,
        neighbor: GridPos,
    },
}

/// Errors produced when restoring a network from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// The group ids do not agree with the captured slot bookkeeping.
    #[error("group ids do not match the captured slot table state")]
    InconsistentSlots,

    /// The same cell is listed in more than one group.
    #[error("cell {pos} appears in more than one group")]
    DuplicateCell { pos: GridPos },

    /// A group was captured with no members.
    #[error("group {id} has no members")]
    EmptyGroup { id: GroupId },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::flood::{flood_fill, flood_fill_faces, Region};
    pub use crate::grid::{FnGrid, PipeGrid};
    pub use crate::group::{Bounds, PipeGroup};
    pub use crate::highlight::{build_highlight_mesh, HighlightMesh};
    pub use crate::network::{AddOutcome, PipeNetwork, RemoveOutcome};
    pub use crate::pos::{Face, GridPos};
    pub use crate::slot::{GroupId, SlotTable};
    pub use crate::snapshot::{GroupSnapshot, NetworkSnapshot};
    pub use crate::{InvariantViolation, NetworkError, SnapshotError};
}
