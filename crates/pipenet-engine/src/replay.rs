//! Edit recording and deterministic replay with checkpoint verification.
//!
//! A [`ReplayRecorder`] captures an initial [`SessionSnapshot`], every edit
//! applied afterwards, and periodic state hash checkpoints. [`replay`] restores
//! the snapshot into a session, re-applies the edits in order and compares
//! hashes at each checkpoint, reporting the first divergence.
//!
//! # Example
//!
//! ```
//! use pipenet_engine::prelude::*;
//! use pipenet_engine::replay::{replay, ReplayRecorder};
//!
//! let mut session = PipeSession::new(SessionConfig::default());
//! let mut recorder = ReplayRecorder::new(session.capture_snapshot(), 2);
//!
//! for x in 0..6 {
//!     let edit = Edit::Place(GridPos::new(x, 0, 0));
//!     recorder
//!         .record_edit(session.edit_count(), edit, Some(session.state_hash()))
//!         .unwrap();
//!     session.apply(edit).unwrap();
//! }
//! let log = recorder.finish(Some(session.state_hash()));
//!
//! let mut fresh = PipeSession::new(SessionConfig::default());
//! let result = replay(&mut fresh, &log).unwrap();
//! assert!(result.completed);
//! assert!(result.first_divergence.is_none());
//! assert_eq!(fresh.state_hash(), session.state_hash());
//! ```

use std::collections::BTreeMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::session::{Edit, PipeSession};
use crate::snapshot::SessionSnapshot;

// ---------------------------------------------------------------------------
// ReplayLog
// ---------------------------------------------------------------------------

/// Initial snapshot plus the ordered edits and checkpoints recorded after it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayLog {
    /// Replay begins by restoring this snapshot.
    pub initial_snapshot: SessionSnapshot,
    /// Number of edits recorded. Replay applies exactly this many.
    pub total_edits: u64,
    pub entries: Vec<ReplayEntry>,
}

/// A single entry in a [`ReplayLog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayEntry {
    /// The edit applied at `index`.
    Edit { index: u64, edit: Edit },
    /// State hash taken before the edit at `index` was applied. A checkpoint
    /// one past the last edit holds the final state.
    Checkpoint { index: u64, state_hash: String },
}

// ---------------------------------------------------------------------------
// ReplayResult
// ---------------------------------------------------------------------------

/// The outcome of [`replay`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayResult {
    /// Whether every edit was re-applied and every checkpoint matched.
    pub completed: bool,
    pub edits_replayed: u64,
    /// First checkpoint whose hash did not match. `None` if all matched.
    pub first_divergence: Option<ReplayDivergence>,
}

/// Where a replay stopped agreeing with the recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayDivergence {
    pub index: u64,
    pub expected_hash: String,
    pub actual_hash: String,
}

// ---------------------------------------------------------------------------
// ReplayRecorder
// ---------------------------------------------------------------------------

/// Builds a [`ReplayLog`] while a session runs.
///
/// Call [`record_edit`](Self::record_edit) before applying each edit, with
/// the session's current edit count as the index, and
/// [`finish`](Self::finish) when done.
pub struct ReplayRecorder {
    log: ReplayLog,
    /// Edits between checkpoints. 0 checkpoints whenever a hash is supplied.
    checkpoint_interval: u64,
    last_index: Option<u64>,
}

impl ReplayRecorder {
    pub fn new(snapshot: SessionSnapshot, checkpoint_interval: u64) -> Self {
        Self {
            log: ReplayLog {
                initial_snapshot: snapshot,
                total_edits: 0,
                entries: Vec::new(),
            },
            checkpoint_interval,
            last_index: None,
        }
    }

    /// Record the edit about to be applied at `index`.
    ///
    /// `index` must be exactly one past the previous call (or the snapshot's
    /// edit count on the first call). A checkpoint is recorded when
    /// `state_hash` is supplied and `index` falls on the checkpoint interval.
    pub fn record_edit(
        &mut self,
        index: u64,
        edit: Edit,
        state_hash: Option<String>,
    ) -> anyhow::Result<()> {
        let expected = match self.last_index {
            Some(prev) => prev + 1,
            None => self.log.initial_snapshot.edit_count,
        };
        anyhow::ensure!(
            index == expected,
            "edit index {index} recorded out of order, expected {expected}"
        );
        self.last_index = Some(index);
        self.log.total_edits += 1;

        if let Some(hash) = state_hash {
            self.push_checkpoint(index, hash);
        }
        self.log.entries.push(ReplayEntry::Edit { index, edit });
        Ok(())
    }

    fn push_checkpoint(&mut self, index: u64, state_hash: String) {
        let due = self.checkpoint_interval == 0 || index % self.checkpoint_interval == 0;
        if due {
            self.log
                .entries
                .push(ReplayEntry::Checkpoint { index, state_hash });
        }
    }

    /// Consume the recorder. `final_state_hash`, if given, is always recorded
    /// as a checkpoint after the last edit.
    pub fn finish(mut self, final_state_hash: Option<String>) -> ReplayLog {
        if let Some(state_hash) = final_state_hash {
            let index = self.log.initial_snapshot.edit_count + self.log.total_edits;
            self.log
                .entries
                .push(ReplayEntry::Checkpoint { index, state_hash });
        }
        self.log
    }
}

// ---------------------------------------------------------------------------
// replay()
// ---------------------------------------------------------------------------

/// Replay `log` on `session`, verifying every checkpoint.
///
/// The log is validated before the session is touched: duplicate entries, a
/// missing edit, or an entry outside the recorded range is an error and
/// leaves the session unmodified. Replay stops at the first divergence. An
/// edit the network rejects during replay is an error.
pub fn replay(session: &mut PipeSession, log: &ReplayLog) -> anyhow::Result<ReplayResult> {
    let start = log.initial_snapshot.edit_count;
    let end = start.checked_add(log.total_edits).ok_or_else(|| {
        anyhow::anyhow!(
            "edit range overflow: start ({start}) + total_edits ({}) exceeds u64::MAX",
            log.total_edits
        )
    })?;

    let mut edits: BTreeMap<u64, Edit> = BTreeMap::new();
    let mut checkpoints: BTreeMap<u64, &str> = BTreeMap::new();
    for entry in &log.entries {
        match entry {
            ReplayEntry::Edit { index, edit } => {
                if !(start..end).contains(index) {
                    return Err(anyhow::anyhow!(
                        "replay log has an Edit entry at {index} outside {start}..{end}"
                    ));
                }
                if edits.insert(*index, *edit).is_some() {
                    return Err(anyhow::anyhow!(
                        "replay log contains duplicate Edit entry at {index}"
                    ));
                }
            }
            ReplayEntry::Checkpoint { index, state_hash } => {
                if !(start..=end).contains(index) {
                    return Err(anyhow::anyhow!(
                        "replay log has a Checkpoint entry at {index} outside {start}..={end}"
                    ));
                }
                if checkpoints.insert(*index, state_hash.as_str()).is_some() {
                    return Err(anyhow::anyhow!(
                        "replay log contains duplicate Checkpoint entry at {index}"
                    ));
                }
            }
        }
    }
    if edits.len() as u64 != log.total_edits {
        return Err(anyhow::anyhow!(
            "replay log records {} edits but has {} Edit entries",
            log.total_edits,
            edits.len()
        ));
    }

    session
        .restore_from_snapshot(&log.initial_snapshot)
        .context("failed to restore initial snapshot for replay")?;

    let mut edits_replayed = 0;
    for index in start..=end {
        if let Some(divergence) = check_checkpoint(session, &checkpoints, index) {
            warn!(
                index,
                expected = %divergence.expected_hash,
                actual = %divergence.actual_hash,
                "replay diverged"
            );
            return Ok(ReplayResult {
                completed: false,
                edits_replayed,
                first_divergence: Some(divergence),
            });
        }
        if let Some(&edit) = edits.get(&index) {
            session
                .apply(edit)
                .with_context(|| format!("replayed edit {index} ({edit:?}) was rejected"))?;
            edits_replayed += 1;
        }
    }

    debug!(edits_replayed, checkpoints = checkpoints.len(), "replay completed");
    Ok(ReplayResult {
        completed: true,
        edits_replayed,
        first_divergence: None,
    })
}

fn check_checkpoint(
    session: &PipeSession,
    checkpoints: &BTreeMap<u64, &str>,
    index: u64,
) -> Option<ReplayDivergence> {
    let expected = checkpoints.get(&index)?;
    let actual = session.state_hash();
    if actual == *expected {
        return None;
    }
    Some(ReplayDivergence {
        index,
        expected_hash: (*expected).to_string(),
        actual_hash: actual,
    })
}
