//! Topology journal for tracking every group-level change of a pipe network.
//!
//! The [`TopologyJournal`] records what each placement or removal did to the
//! group partition. Each entry ([`TopologyChange`]) carries a monotonically
//! increasing sequence number, the cell whose event caused it, and a
//! [`ChangeKind`] describing the effect (created, joined, merged, shrunk,
//! split, ...).
//!
//! Placements on cells that were already tracked change nothing and are not
//! recorded.
//!
//! # Query API
//!
//! - **Group**: [`TopologyJournal::changes_for_group`]
//! - **Cell**: [`TopologyJournal::changes_at`]
//! - **Restructuring**: [`TopologyJournal::merges`], [`TopologyJournal::splits`]
//!
//! # Example
//!
//! ```
//! use std::collections::HashSet;
//! use pipenet_core::prelude::*;
//! use pipenet_journal::journal::{ChangeKind, TopologyJournal};
//!
//! let mut world = HashSet::new();
//! let mut network = PipeNetwork::new();
//! let mut journal = TopologyJournal::new();
//!
//! let pos = GridPos::new(0, 0, 0);
//! world.insert(pos);
//! let outcome = network.on_pipe_added(&world, pos).unwrap();
//! journal.record_added(pos, &outcome);
//!
//! assert_eq!(journal.len(), 1);
//! assert!(matches!(journal.all_changes()[0].kind, ChangeKind::Created { .. }));
//! ```

use std::collections::VecDeque;

use pipenet_core::network::{AddOutcome, RemoveOutcome};
use pipenet_core::pos::GridPos;
use pipenet_core::slot::GroupId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ChangeKind
// ---------------------------------------------------------------------------

/// The effect of one event on the group partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// A lone placement founded `group`.
    Created { group: GroupId },
    /// A placement extended `group`.
    Joined { group: GroupId },
    /// A bridge placement dissolved `absorbed` and built `into`.
    Merged {
        into: GroupId,
        absorbed: Vec<GroupId>,
    },
    /// A removal emptied and freed `group`.
    Destroyed { group: GroupId },
    /// A removal left `group` with no connectivity question to answer.
    Shrunk { group: GroupId },
    /// A removal was probed and `group` stayed connected.
    ProbedConnected { group: GroupId },
    /// A removal cut the component: `from` were dissolved, `into` were built.
    Split {
        from: Vec<GroupId>,
        into: Vec<GroupId>,
    },
}

impl ChangeKind {
    /// Translate a placement outcome. Returns `None` for no-op placements.
    pub fn from_added(outcome: &AddOutcome) -> Option<Self> {
        match outcome {
            AddOutcome::AlreadyAssigned(_) => None,
            AddOutcome::Created(group) => Some(ChangeKind::Created { group: *group }),
            AddOutcome::Joined(group) => Some(ChangeKind::Joined { group: *group }),
            AddOutcome::Merged { into, absorbed } => Some(ChangeKind::Merged {
                into: *into,
                absorbed: absorbed.clone(),
            }),
        }
    }

    /// Translate a removal outcome.
    pub fn from_removed(outcome: &RemoveOutcome) -> Self {
        match outcome {
            RemoveOutcome::Destroyed(group) => ChangeKind::Destroyed { group: *group },
            RemoveOutcome::Shrunk(group) => ChangeKind::Shrunk { group: *group },
            RemoveOutcome::StillConnected(group) => ChangeKind::ProbedConnected { group: *group },
            RemoveOutcome::Split { from, into } => ChangeKind::Split {
                from: from.clone(),
                into: into.clone(),
            },
        }
    }

    /// Returns `true` if `group` was created, modified or dissolved by this
    /// change.
    pub fn involves(&self, group: GroupId) -> bool {
        match self {
            ChangeKind::Created { group: g }
            | ChangeKind::Joined { group: g }
            | ChangeKind::Destroyed { group: g }
            | ChangeKind::Shrunk { group: g }
            | ChangeKind::ProbedConnected { group: g } => *g == group,
            ChangeKind::Merged { into, absorbed } => *into == group || absorbed.contains(&group),
            ChangeKind::Split { from, into } => from.contains(&group) || into.contains(&group),
        }
    }

    /// Returns `true` for merges and splits, the changes that rebuilt groups.
    pub fn is_restructuring(&self) -> bool {
        matches!(self, ChangeKind::Merged { .. } | ChangeKind::Split { .. })
    }
}

// ---------------------------------------------------------------------------
// TopologyChange
// ---------------------------------------------------------------------------

/// A single recorded change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyChange {
    /// Position of this change in the journal's lifetime, starting at 0.
    /// Keeps increasing across evictions and [`TopologyJournal::clear`].
    pub sequence: u64,
    /// The cell whose placement or removal caused the change.
    pub cell: GridPos,
    /// What happened to the partition.
    pub kind: ChangeKind,
}

// ---------------------------------------------------------------------------
// TopologyJournal
// ---------------------------------------------------------------------------

/// Accumulates [`TopologyChange`] entries and answers queries over them.
///
/// With a capacity limit the journal behaves as a ring: once full, recording a
/// change evicts the oldest one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologyJournal {
    changes: VecDeque<TopologyChange>,
    capacity: Option<usize>,
    next_sequence: u64,
}

impl TopologyJournal {
    /// Create a new, unbounded journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a journal that keeps at most `capacity` changes.
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            changes: VecDeque::with_capacity(capacity),
            capacity: Some(capacity),
            next_sequence: 0,
        }
    }

    /// Record an arbitrary change and return its sequence number.
    pub fn record(&mut self, cell: GridPos, kind: ChangeKind) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return sequence;
            }
            while self.changes.len() >= capacity {
                if let Some(evicted) = self.changes.pop_front() {
                    tracing::trace!(
                        sequence = evicted.sequence,
                        "journal full, evicting oldest change"
                    );
                }
            }
        }

        self.changes.push_back(TopologyChange {
            sequence,
            cell,
            kind,
        });
        sequence
    }

    /// Record the outcome of a placement. No-op placements are skipped and
    /// return `None`.
    pub fn record_added(&mut self, cell: GridPos, outcome: &AddOutcome) -> Option<u64> {
        let kind = ChangeKind::from_added(outcome)?;
        Some(self.record(cell, kind))
    }

    /// Record the outcome of a removal.
    pub fn record_removed(&mut self, cell: GridPos, outcome: &RemoveOutcome) -> u64 {
        self.record(cell, ChangeKind::from_removed(outcome))
    }

    /// Drop every retained change. Sequence numbers keep counting.
    pub fn clear(&mut self) {
        self.changes.clear();
    }

    /// Returns the number of retained changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns `true` if no changes are retained.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// The capacity limit, if any.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Total number of changes ever recorded, evicted ones included.
    pub fn total_recorded(&self) -> u64 {
        self.next_sequence
    }

    /// All retained changes, oldest first.
    pub fn all_changes(&self) -> Vec<&TopologyChange> {
        self.changes.iter().collect()
    }

    /// Iterate retained changes, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TopologyChange> {
        self.changes.iter()
    }

    /// The most recent change.
    pub fn last(&self) -> Option<&TopologyChange> {
        self.changes.back()
    }

    /// Changes that created, touched or dissolved `group`.
    pub fn changes_for_group(&self, group: GroupId) -> impl Iterator<Item = &TopologyChange> {
        self.changes.iter().filter(move |c| c.kind.involves(group))
    }

    /// Changes caused by events at `cell`.
    pub fn changes_at(&self, cell: GridPos) -> impl Iterator<Item = &TopologyChange> {
        self.changes.iter().filter(move |c| c.cell == cell)
    }

    /// Bridge placements.
    pub fn merges(&self) -> impl Iterator<Item = &TopologyChange> {
        self.changes
            .iter()
            .filter(|c| matches!(c.kind, ChangeKind::Merged { .. }))
    }

    /// Removals that cut a component apart.
    pub fn splits(&self) -> impl Iterator<Item = &TopologyChange> {
        self.changes
            .iter()
            .filter(|c| matches!(c.kind, ChangeKind::Split { .. }))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
