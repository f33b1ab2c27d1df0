//! In-memory stand-in for the host world's pipe blocks.

use std::collections::BTreeSet;

use pipenet_core::grid::PipeGrid;
use pipenet_core::pos::GridPos;
use serde::{Deserialize, Serialize};

/// The set of cells currently holding a pipe block.
///
/// Ordered so that iteration (and therefore reload order) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridWorld {
    pipes: BTreeSet<GridPos>,
}

impl GridWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a pipe block. Returns `false` if one was already there.
    pub fn place(&mut self, pos: GridPos) -> bool {
        self.pipes.insert(pos)
    }

    /// Clear a pipe block. Returns `false` if there was none.
    pub fn remove(&mut self, pos: GridPos) -> bool {
        self.pipes.remove(&pos)
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.pipes.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    /// Pipe cells in ascending coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.pipes.iter().copied()
    }

    pub fn clear(&mut self) {
        self.pipes.clear();
    }
}

impl PipeGrid for GridWorld {
    fn is_pipe(&self, pos: GridPos) -> bool {
        self.pipes.contains(&pos)
    }
}

impl FromIterator<GridPos> for GridWorld {
    fn from_iter<I: IntoIterator<Item = GridPos>>(iter: I) -> Self {
        Self {
            pipes: iter.into_iter().collect(),
        }
    }
}
