//! Pipenet Engine -- host-side driver for a pipe network.
//!
//! This crate builds on [`pipenet_core`] and [`pipenet_journal`] to provide
//! what a game around the network needs: an in-memory world of pipe blocks,
//! a session that applies edits in order and journals their effect,
//! hash-verified snapshots, deterministic edit replay, and seeded workload
//! generation.
//!
//! # Quick Start
//!
//! ```
//! use pipenet_engine::prelude::*;
//!
//! let mut session = PipeSession::new(SessionConfig {
//!     verify_invariants: true,
//!     ..Default::default()
//! });
//!
//! let edits = generate_edits(&ScenarioConfig {
//!     edits: 200,
//!     ..Default::default()
//! })
//! .unwrap();
//! session.apply_all(edits).unwrap();
//! assert_eq!(session.edit_count(), 200);
//! session.verify().unwrap();
//! ```

#![deny(unsafe_code)]

pub mod replay;
pub mod scenario;
pub mod session;
pub mod snapshot;
pub mod world;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the core crate for convenience.
pub use pipenet_core;

/// Re-export the journal crate for convenience.
pub use pipenet_journal;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common session usage.
pub mod prelude {
    pub use pipenet_core::prelude::*;

    pub use crate::replay::{
        replay, ReplayDivergence, ReplayEntry, ReplayLog, ReplayRecorder, ReplayResult,
    };
    pub use crate::scenario::{generate_edits, ScenarioConfig};
    pub use crate::session::{Edit, EditOutcome, PipeSession, SessionConfig, SessionError};
    pub use crate::snapshot::SessionSnapshot;
    pub use crate::world::GridWorld;

    pub use pipenet_journal::journal::{ChangeKind, TopologyChange, TopologyJournal};
}
