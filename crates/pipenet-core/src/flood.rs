//! Frontier-based connectivity search over the grid.
//!
//! [`flood_fill`] walks outward from an origin cell, expanding only into cells
//! accepted by a membership predicate. The walk is iterative (explicit work
//! queue) so arbitrarily long pipe runs never grow the call stack.

use std::collections::{HashSet, VecDeque};

use crate::pos::GridPos;

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// The set of cells reached by a flood fill.
///
/// Cells are kept in visit order (breadth-first, neighbors in
/// [`Face::ALL`](crate::pos::Face::ALL) order) alongside a hash set for
/// membership tests.
#[derive(Debug, Clone, Default)]
pub struct Region {
    order: Vec<GridPos>,
    visited: HashSet<GridPos>,
}

impl Region {
    /// Returns `true` if the flood reached `pos`.
    pub fn contains(&self, pos: GridPos) -> bool {
        self.visited.contains(&pos)
    }

    /// Number of reached cells, origin included.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always `false` for a region produced by [`flood_fill`].
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Reached cells in visit order. The origin is first.
    pub fn cells(&self) -> &[GridPos] {
        &self.order
    }

    /// Consume the region, keeping only the membership set.
    pub fn into_set(self) -> HashSet<GridPos> {
        self.visited
    }

    fn visit(&mut self, pos: GridPos) -> bool {
        if self.visited.insert(pos) {
            self.order.push(pos);
            true
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Flood fill
// ---------------------------------------------------------------------------

/// Breadth-first search from `origin`.
///
/// - `neighbors` yields the cells adjacent to a cell.
/// - `is_member` decides whether a neighbor may be entered. The origin is
///   never tested; it is assumed to already belong.
/// - `on_visit` fires exactly once per newly visited cell, origin first.
///
/// Each cell enters the queue at most once, so the cost is linear in the
/// number of reachable member cells.
pub fn flood_fill<N, I, P, V>(
    origin: GridPos,
    mut neighbors: N,
    mut is_member: P,
    mut on_visit: V,
) -> Region
where
    N: FnMut(GridPos) -> I,
    I: IntoIterator<Item = GridPos>,
    P: FnMut(GridPos) -> bool,
    V: FnMut(GridPos),
{
    let mut region = Region::default();
    let mut queue = VecDeque::new();

    region.visit(origin);
    on_visit(origin);
    queue.push_back(origin);

    while let Some(current) = queue.pop_front() {
        for next in neighbors(current) {
            if region.contains(next) || !is_member(next) {
                continue;
            }
            region.visit(next);
            on_visit(next);
            queue.push_back(next);
        }
    }

    region
}

/// Flood fill over the six face neighbors with no visit callback.
pub fn flood_fill_faces<P>(origin: GridPos, is_member: P) -> Region
where
    P: FnMut(GridPos) -> bool,
{
    flood_fill(
        origin,
        |pos| pos.neighbors().map(|(_, next)| next),
        is_member,
        |_| {},
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn line(len: i32) -> HashSet<GridPos> {
        (0..len).map(|x| GridPos::new(x, 0, 0)).collect()
    }

    #[test]
    fn origin_is_included_without_test() {
        let region = flood_fill_faces(GridPos::ZERO, |_| false);
        assert_eq!(region.cells(), &[GridPos::ZERO]);
    }

    #[test]
    fn reaches_whole_line() {
        let cells = line(20);
        let region = flood_fill_faces(GridPos::ZERO, |p| cells.contains(&p));
        assert_eq!(region.len(), 20);
        assert_eq!(region.into_set(), cells);
    }

    #[test]
    fn stops_at_gaps() {
        let mut cells = line(10);
        cells.remove(&GridPos::new(5, 0, 0));
        let region = flood_fill_faces(GridPos::ZERO, |p| cells.contains(&p));
        assert_eq!(region.len(), 5);
        assert!(!region.contains(GridPos::new(6, 0, 0)));
    }

    #[test]
    fn diagonal_cells_are_not_adjacent() {
        let cells: HashSet<GridPos> = [GridPos::ZERO, GridPos::new(1, 1, 0)].into();
        let region = flood_fill_faces(GridPos::ZERO, |p| cells.contains(&p));
        assert_eq!(region.len(), 1);
    }

    #[test]
    fn visit_callback_fires_once_per_cell_origin_first() {
        let mut cells = line(4);
        cells.insert(GridPos::new(0, 1, 0));
        cells.insert(GridPos::new(1, 1, 0));
        let mut seen = Vec::new();
        let region = flood_fill(
            GridPos::ZERO,
            |p| p.neighbors().map(|(_, n)| n),
            |p| cells.contains(&p),
            |p| seen.push(p),
        );
        assert_eq!(seen.first(), Some(&GridPos::ZERO));
        assert_eq!(seen.len(), cells.len());
        assert_eq!(seen, region.cells());
    }

    #[test]
    fn loops_terminate() {
        let ring: HashSet<GridPos> = [
            GridPos::new(0, 0, 0),
            GridPos::new(1, 0, 0),
            GridPos::new(1, 0, 1),
            GridPos::new(0, 0, 1),
        ]
        .into();
        let region = flood_fill_faces(GridPos::ZERO, |p| ring.contains(&p));
        assert_eq!(region.len(), 4);
    }

    #[test]
    fn long_run_does_not_recurse() {
        let cells = line(200_000);
        let region = flood_fill_faces(GridPos::ZERO, |p| cells.contains(&p));
        assert_eq!(region.len(), 200_000);
    }

    #[test]
    fn custom_neighbor_fn_is_respected() {
        // Only walk east.
        let cells = line(5);
        let region = flood_fill(
            GridPos::new(2, 0, 0),
            |p| [p + GridPos::new(1, 0, 0)],
            |p| cells.contains(&p),
            |_| {},
        );
        let xs: Vec<i32> = region.cells().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![2, 3, 4]);
    }

    #[test]
    fn visit_order_is_deterministic() {
        let cells: HashSet<GridPos> = (-3..=3)
            .flat_map(|x| (-3..=3).map(move |z| GridPos::new(x, 0, z)))
            .collect();
        let a = flood_fill_faces(GridPos::ZERO, |p| cells.contains(&p));
        let b = flood_fill_faces(GridPos::ZERO, |p| cells.contains(&p));
        assert_eq!(a.cells(), b.cells());
    }
}
