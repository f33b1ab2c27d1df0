//! The world seen through the eyes of the pipe network.
//!
//! The network never owns pipe blocks. It only asks the host whether a cell
//! currently holds a connectable pipe, through the [`PipeGrid`] trait.

use std::collections::{BTreeSet, HashSet};

use crate::pos::GridPos;

/// Read access to the host world's pipe blocks.
pub trait PipeGrid {
    /// Returns `true` if `pos` holds a pipe that can join a network.
    fn is_pipe(&self, pos: GridPos) -> bool;
}

impl<G: PipeGrid + ?Sized> PipeGrid for &G {
    fn is_pipe(&self, pos: GridPos) -> bool {
        (**self).is_pipe(pos)
    }
}

impl PipeGrid for HashSet<GridPos> {
    fn is_pipe(&self, pos: GridPos) -> bool {
        self.contains(&pos)
    }
}

impl PipeGrid for BTreeSet<GridPos> {
    fn is_pipe(&self, pos: GridPos) -> bool {
        self.contains(&pos)
    }
}

/// Adapts a closure into a [`PipeGrid`].
///
/// ```
/// use pipenet_core::grid::{FnGrid, PipeGrid};
/// use pipenet_core::pos::GridPos;
///
/// let floor = FnGrid(|p: GridPos| p.y == 0);
/// assert!(floor.is_pipe(GridPos::new(4, 0, -2)));
/// assert!(!floor.is_pipe(GridPos::new(4, 1, -2)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnGrid<F>(pub F);

impl<F: Fn(GridPos) -> bool> PipeGrid for FnGrid<F> {
    fn is_pipe(&self, pos: GridPos) -> bool {
        (self.0)(pos)
    }
}
