//! Seeded generation of random edit sequences.
//!
//! Every generated edit is valid when applied in order to an empty session:
//! placements target empty cells and removals target placed ones.

use std::collections::HashSet;

use pipenet_core::pos::{Face, GridPos};
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::session::Edit;

/// Parameters of a generated workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub seed: u64,
    /// Edits stay inside `0..size[i]` on each axis.
    pub size: [i32; 3],
    /// Number of edits to generate.
    pub edits: usize,
    /// Probability that an edit is a removal when something can be removed.
    pub remove_ratio: f64,
    /// Probability that a placement extends an existing pipe instead of
    /// landing anywhere in the box. Higher values give longer runs and more
    /// merges and splits.
    pub grow_ratio: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            size: [16, 4, 16],
            edits: 1_000,
            remove_ratio: 0.35,
            grow_ratio: 0.75,
        }
    }
}

impl ScenarioConfig {
    fn contains(&self, pos: GridPos) -> bool {
        (0..self.size[0]).contains(&pos.x)
            && (0..self.size[1]).contains(&pos.y)
            && (0..self.size[2]).contains(&pos.z)
    }

    fn volume(&self) -> usize {
        self.size.iter().map(|&s| s.max(0) as usize).product()
    }
}

/// Generate `config.edits` edits. The same config always yields the same
/// sequence.
///
/// Fails if either ratio is not a probability in `[0, 1]`.
pub fn generate_edits(config: &ScenarioConfig) -> anyhow::Result<Vec<Edit>> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&config.remove_ratio),
        "remove_ratio {} is not a probability in [0, 1]",
        config.remove_ratio
    );
    anyhow::ensure!(
        (0.0..=1.0).contains(&config.grow_ratio),
        "grow_ratio {} is not a probability in [0, 1]",
        config.grow_ratio
    );

    let mut rng = Pcg64::seed_from_u64(config.seed);
    let mut placed: Vec<GridPos> = Vec::new();
    let mut occupied: HashSet<GridPos> = HashSet::new();
    let mut edits = Vec::with_capacity(config.edits);
    let volume = config.volume();
    if volume == 0 {
        return Ok(edits);
    }

    while edits.len() < config.edits {
        let full = occupied.len() >= volume;
        let remove = !placed.is_empty() && (full || rng.gen_bool(config.remove_ratio));
        if remove {
            let pos = placed.swap_remove(rng.gen_range(0..placed.len()));
            occupied.remove(&pos);
            edits.push(Edit::Remove(pos));
            continue;
        }

        let pos = if !placed.is_empty() && rng.gen_bool(config.grow_ratio) {
            let from = placed[rng.gen_range(0..placed.len())];
            from.offset_by_face(Face::ALL[rng.gen_range(0..Face::ALL.len())])
        } else {
            GridPos::new(
                rng.gen_range(0..config.size[0]),
                rng.gen_range(0..config.size[1]),
                rng.gen_range(0..config.size[2]),
            )
        };
        if config.contains(pos) && occupied.insert(pos) {
            placed.push(pos);
            edits.push(Edit::Place(pos));
        }
    }
    Ok(edits)
}
