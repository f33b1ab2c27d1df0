//! Session snapshot and restore with state hashing.
//!
//! A [`SessionSnapshot`] captures the world's pipe blocks, the network's group
//! partition (including slot bookkeeping) and the edit counter. The BLAKE3
//! hash covers all three, so a restore can detect tampering or corruption and
//! replay can compare states cheaply.

use anyhow::Context;
use pipenet_core::network::PipeNetwork;
use pipenet_core::pos::GridPos;
use pipenet_core::snapshot::NetworkSnapshot;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::session::PipeSession;
use crate::world::GridWorld;

/// A complete, serializable snapshot of a [`PipeSession`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Edits applied before the snapshot was taken.
    pub edit_count: u64,
    /// Pipe cells in ascending coordinate order.
    pub world: Vec<GridPos>,
    /// Group partition and slot bookkeeping.
    pub network: NetworkSnapshot,
    /// Hex-encoded BLAKE3 hash of the fields above.
    pub state_hash: String,
}

impl PipeSession {
    /// Capture a deterministic snapshot of the session.
    pub fn capture_snapshot(&self) -> SessionSnapshot {
        let world: Vec<GridPos> = self.world().iter().collect();
        let network = self.network().capture_snapshot();
        let state_hash = compute_hash(self.edit_count(), &world, &network);
        SessionSnapshot {
            edit_count: self.edit_count(),
            world,
            network,
            state_hash,
        }
    }

    /// Replace the session's world, network and edit counter with the
    /// snapshot's. The configuration is kept and the journal is cleared.
    ///
    /// Fails without modifying the session if the hash does not match, the
    /// network cannot be rebuilt, or the partition disagrees with the world.
    pub fn restore_from_snapshot(&mut self, snapshot: &SessionSnapshot) -> anyhow::Result<()> {
        let actual = compute_hash(snapshot.edit_count, &snapshot.world, &snapshot.network);
        if actual != snapshot.state_hash {
            return Err(anyhow::anyhow!(
                "snapshot hash mismatch: expected {}, computed {}",
                snapshot.state_hash,
                actual
            ));
        }

        let world: GridWorld = snapshot.world.iter().copied().collect();
        let network = PipeNetwork::restore_from_snapshot(&snapshot.network)
            .context("failed to rebuild pipe network from snapshot")?;
        network
            .check_invariants(&world)
            .context("snapshot network disagrees with snapshot world")?;

        self.replace_state(world, network, snapshot.edit_count);
        debug!(
            edit_count = snapshot.edit_count,
            groups = self.network().group_count(),
            "session restored from snapshot"
        );
        Ok(())
    }

    /// Hash of the current state, identical to what
    /// [`capture_snapshot`](Self::capture_snapshot) would record.
    pub fn state_hash(&self) -> String {
        let world: Vec<GridPos> = self.world().iter().collect();
        compute_hash(self.edit_count(), &world, &self.network().capture_snapshot())
    }
}

fn compute_hash(edit_count: u64, world: &[GridPos], network: &NetworkSnapshot) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&edit_count.to_le_bytes());
    hash_cells(&mut hasher, world);

    hasher.update(&(network.slots.generations.len() as u64).to_le_bytes());
    for generation in &network.slots.generations {
        hasher.update(&generation.to_le_bytes());
    }
    hasher.update(&(network.slots.free_indices.len() as u64).to_le_bytes());
    for index in &network.slots.free_indices {
        hasher.update(&index.to_le_bytes());
    }

    hasher.update(&(network.groups.len() as u64).to_le_bytes());
    for group in &network.groups {
        hasher.update(&group.id.to_raw().to_le_bytes());
        hash_cells(&mut hasher, &group.members);
    }
    hasher.finalize().to_hex().to_string()
}

fn hash_cells(hasher: &mut blake3::Hasher, cells: &[GridPos]) {
    hasher.update(&(cells.len() as u64).to_le_bytes());
    for cell in cells {
        hasher.update(&cell.x.to_le_bytes());
        hasher.update(&cell.y.to_le_bytes());
        hasher.update(&cell.z.to_le_bytes());
    }
}
