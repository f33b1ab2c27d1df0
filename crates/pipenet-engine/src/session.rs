//! Event-driven pipe session.
//!
//! A [`PipeSession`] plays the role of the host: it owns the world's pipe
//! blocks, the [`PipeNetwork`] that tracks their groups, and a
//! [`TopologyJournal`] of what every edit did. Each edit is applied the way a
//! game delivers it -- the block is written (or cleared) first, then the
//! network is notified -- and runs to completion before the next one.
//!
//! # Example
//!
//! ```
//! use pipenet_engine::prelude::*;
//!
//! let mut session = PipeSession::new(SessionConfig::default());
//! for x in 0..4 {
//!     session.place(GridPos::new(x, 0, 0)).unwrap();
//! }
//! assert_eq!(session.network().group_count(), 1);
//!
//! session.remove(GridPos::new(1, 0, 0)).unwrap();
//! assert_eq!(session.network().group_count(), 2);
//! assert_eq!(session.journal().splits().count(), 1);
//! ```

use pipenet_core::highlight::{build_highlight_mesh, HighlightMesh};
use pipenet_core::network::{AddOutcome, PipeNetwork, RemoveOutcome};
use pipenet_core::pos::GridPos;
use pipenet_core::{InvariantViolation, NetworkError};
use pipenet_journal::journal::TopologyJournal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::world::GridWorld;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`PipeSession`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Run the full invariant check after every edit. Linear in the number
    /// of tracked cells, so intended for tests and debugging.
    pub verify_invariants: bool,
    /// Maximum number of journal entries kept. `None` keeps everything.
    pub journal_capacity: Option<usize>,
    /// Outward offset, in world units, of highlight meshes.
    pub highlight_inflate: f32,
}

impl Default for SessionConfig {
    /// No per-edit verification, 4096 journal entries, 0.02 highlight inflate.
    fn default() -> Self {
        Self {
            verify_invariants: false,
            journal_capacity: Some(4096),
            highlight_inflate: 0.02,
        }
    }
}

// ---------------------------------------------------------------------------
// Edit
// ---------------------------------------------------------------------------

/// One world edit delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edit {
    Place(GridPos),
    Remove(GridPos),
}

impl Edit {
    /// The edited cell.
    pub fn pos(self) -> GridPos {
        match self {
            Edit::Place(pos) | Edit::Remove(pos) => pos,
        }
    }
}

/// Result of an [`Edit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditOutcome {
    Added(AddOutcome),
    Removed(RemoveOutcome),
}

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Errors produced while applying edits.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// The network rejected the event.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Per-edit verification found the network inconsistent.
    #[error("invariant violated after edit {edit_index} ({edit:?}): {violation}")]
    Invariant {
        edit_index: u64,
        edit: Edit,
        violation: InvariantViolation,
    },
}

// ---------------------------------------------------------------------------
// PipeSession
// ---------------------------------------------------------------------------

/// Host-side driver owning the world, the network, and the journal.
#[derive(Debug, Clone)]
pub struct PipeSession {
    config: SessionConfig,
    world: GridWorld,
    network: PipeNetwork,
    journal: TopologyJournal,
    /// Number of edits applied successfully.
    edit_count: u64,
}

impl PipeSession {
    /// Create an empty session.
    pub fn new(config: SessionConfig) -> Self {
        let journal = match config.journal_capacity {
            Some(capacity) => TopologyJournal::with_capacity_limit(capacity),
            None => TopologyJournal::new(),
        };
        Self {
            config,
            world: GridWorld::new(),
            network: PipeNetwork::new(),
            journal,
            edit_count: 0,
        }
    }

    /// Create a session over pre-existing pipe blocks, as after loading a
    /// saved world, and build all groups from them.
    pub fn with_world(config: SessionConfig, world: GridWorld) -> Result<Self, SessionError> {
        let mut session = Self::new(config);
        session.world = world;
        session.reload()?;
        Ok(session)
    }

    // -- edits --------------------------------------------------------------

    /// Write a pipe block at `pos` and notify the network.
    pub fn place(&mut self, pos: GridPos) -> Result<AddOutcome, SessionError> {
        self.world.place(pos);
        let outcome = self.network.on_pipe_added(&self.world, pos)?;
        self.journal.record_added(pos, &outcome);
        self.finish_edit(Edit::Place(pos))?;
        Ok(outcome)
    }

    /// Clear the pipe block at `pos` and notify the network.
    ///
    /// Fails without touching the world if `pos` is not a tracked pipe.
    pub fn remove(&mut self, pos: GridPos) -> Result<RemoveOutcome, SessionError> {
        if !self.network.is_tracked(pos) {
            return Err(NetworkError::NotFound { pos }.into());
        }
        self.world.remove(pos);
        let outcome = self.network.on_pipe_removed(&self.world, pos)?;
        self.journal.record_removed(pos, &outcome);
        self.finish_edit(Edit::Remove(pos))?;
        Ok(outcome)
    }

    /// Apply a single edit.
    pub fn apply(&mut self, edit: Edit) -> Result<EditOutcome, SessionError> {
        match edit {
            Edit::Place(pos) => self.place(pos).map(EditOutcome::Added),
            Edit::Remove(pos) => self.remove(pos).map(EditOutcome::Removed),
        }
    }

    /// Apply edits in order, stopping at the first error.
    pub fn apply_all<I>(&mut self, edits: I) -> Result<Vec<EditOutcome>, SessionError>
    where
        I: IntoIterator<Item = Edit>,
    {
        edits.into_iter().map(|edit| self.apply(edit)).collect()
    }

    /// Rebuild every group from the world's pipe blocks.
    ///
    /// This is the load path: the journal is cleared and each pipe is
    /// re-registered in ascending coordinate order.
    pub fn reload(&mut self) -> Result<(), SessionError> {
        self.network.rebuild(&self.world, self.world.iter())?;
        self.journal.clear();
        info!(
            pipes = self.world.len(),
            groups = self.network.group_count(),
            "pipe session reloaded from world"
        );
        Ok(())
    }

    fn finish_edit(&mut self, edit: Edit) -> Result<(), SessionError> {
        let edit_index = self.edit_count;
        self.edit_count += 1;
        debug!(
            edit_index,
            ?edit,
            groups = self.network.group_count(),
            "edit applied"
        );
        if self.config.verify_invariants {
            if let Err(violation) = self.network.check_invariants(&self.world) {
                warn!(edit_index, ?edit, %violation, "pipe network invariant violated");
                return Err(SessionError::Invariant {
                    edit_index,
                    edit,
                    violation,
                });
            }
        }
        Ok(())
    }

    // -- accessors ----------------------------------------------------------

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn network(&self) -> &PipeNetwork {
        &self.network
    }

    pub fn journal(&self) -> &TopologyJournal {
        &self.journal
    }

    /// Number of edits applied successfully since creation (or since the
    /// snapshot this session was restored from).
    pub fn edit_count(&self) -> u64 {
        self.edit_count
    }

    /// Run the invariant check on demand.
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        self.network.check_invariants(&self.world)
    }

    /// Highlight mesh of the group containing `pos`, for a moused-over pipe.
    pub fn highlight_at(&self, pos: GridPos) -> Option<HighlightMesh> {
        self.network
            .group_at(pos)
            .map(|group| build_highlight_mesh(group, self.config.highlight_inflate))
    }

    pub(crate) fn replace_state(
        &mut self,
        world: GridWorld,
        network: PipeNetwork,
        edit_count: u64,
    ) {
        self.world = world;
        self.network = network;
        self.edit_count = edit_count;
        self.journal.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
