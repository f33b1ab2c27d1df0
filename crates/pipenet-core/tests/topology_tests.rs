//! Scenario tests for the pipe network's merge, split and bookkeeping rules.

use std::collections::HashSet;

use pipenet_core::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A host world that notifies the network the way a game would: the block is
/// written first, then the event is delivered.
struct Host {
    world: HashSet<GridPos>,
    net: PipeNetwork,
}

impl Host {
    fn new() -> Self {
        Self {
            world: HashSet::new(),
            net: PipeNetwork::new(),
        }
    }

    fn place(&mut self, x: i32, y: i32, z: i32) -> AddOutcome {
        let pos = GridPos::new(x, y, z);
        self.world.insert(pos);
        self.net.on_pipe_added(&self.world, pos).unwrap()
    }

    fn remove(&mut self, x: i32, y: i32, z: i32) -> RemoveOutcome {
        let pos = GridPos::new(x, y, z);
        self.world.remove(&pos);
        self.net.on_pipe_removed(&self.world, pos).unwrap()
    }

    fn members_of(&self, x: i32, y: i32, z: i32) -> Vec<GridPos> {
        self.net
            .group_at(GridPos::new(x, y, z))
            .map(PipeGroup::sorted_members)
            .unwrap_or_default()
    }

    fn assert_consistent(&self) {
        if let Err(violation) = self.net.check_invariants(&self.world) {
            panic!("invariant violated: {violation}");
        }
    }
}

fn cells(list: &[(i32, i32, i32)]) -> Vec<GridPos> {
    let mut out: Vec<GridPos> = list.iter().map(|&t| GridPos::from(t)).collect();
    out.sort();
    out
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

#[test]
fn bridge_between_three_single_cell_groups() {
    let mut host = Host::new();
    host.place(0, 0, -1);
    host.place(0, 0, 1);
    host.place(0, -1, 0);
    assert_eq!(host.net.group_count(), 3);

    let outcome = host.place(0, 0, 0);
    assert!(matches!(outcome, AddOutcome::Merged { ref absorbed, .. } if absorbed.len() == 3));
    assert_eq!(host.net.group_count(), 1);
    assert_eq!(
        host.members_of(0, 0, 0),
        cells(&[(0, 0, -1), (0, 0, 1), (0, -1, 0), (0, 0, 0)])
    );
    host.assert_consistent();
}

#[test]
fn bridge_between_two_long_runs_absorbs_everything() {
    let mut host = Host::new();
    for x in 0..10 {
        host.place(x, 0, 0);
        host.place(x, 0, 2);
    }
    assert_eq!(host.net.group_count(), 2);
    host.place(4, 0, 1);
    assert_eq!(host.net.group_count(), 1);
    assert_eq!(host.members_of(0, 0, 0).len(), 21);

    let group = host.net.group_at(GridPos::new(9, 0, 2)).unwrap();
    assert_eq!(group.min_bound(), Some(GridPos::new(0, 0, 0)));
    assert_eq!(group.max_bound(), Some(GridPos::new(9, 0, 2)));
    host.assert_consistent();
}

#[test]
fn touching_same_group_twice_is_a_join_not_a_merge() {
    let mut host = Host::new();
    // U shape; closing it touches one group from two sides.
    for pos in [(0, 0, 0), (0, 0, 1), (1, 0, 1), (2, 0, 1), (2, 0, 0)] {
        host.place(pos.0, pos.1, pos.2);
    }
    let id = host.net.group_of(GridPos::ZERO).unwrap();
    assert_eq!(host.place(1, 0, 0), AddOutcome::Joined(id));
    host.assert_consistent();
}

// ---------------------------------------------------------------------------
// Split
// ---------------------------------------------------------------------------

#[test]
fn cutting_a_line_of_five_in_the_middle() {
    let mut host = Host::new();
    for x in 0..5 {
        host.place(x, 0, 0);
    }
    let outcome = host.remove(2, 0, 0);
    assert!(matches!(outcome, RemoveOutcome::Split { ref into, .. } if into.len() == 2));
    assert_eq!(host.net.group_count(), 2);
    assert_eq!(host.members_of(0, 0, 0), cells(&[(0, 0, 0), (1, 0, 0)]));
    assert_eq!(host.members_of(4, 0, 0), cells(&[(3, 0, 0), (4, 0, 0)]));

    let left = host.net.group_at(GridPos::new(0, 0, 0)).unwrap();
    assert_eq!(left.min_bound(), Some(GridPos::new(0, 0, 0)));
    assert_eq!(left.max_bound(), Some(GridPos::new(1, 0, 0)));
    let right = host.net.group_at(GridPos::new(4, 0, 0)).unwrap();
    assert_eq!(right.min_bound(), Some(GridPos::new(3, 0, 0)));
    assert_eq!(right.max_bound(), Some(GridPos::new(4, 0, 0)));
    host.assert_consistent();
}

#[test]
fn split_with_two_branches_still_joined_elsewhere() {
    let mut host = Host::new();
    // Plus sign where the west and north arms are joined by an extra path.
    for pos in [
        (0, 0, 0),
        (-1, 0, 0),
        (1, 0, 0),
        (0, 0, -1),
        (0, 0, 1),
        (-1, 0, -1),
    ] {
        host.place(pos.0, pos.1, pos.2);
    }
    let RemoveOutcome::Split { into, .. } = host.remove(0, 0, 0) else {
        panic!("expected a split");
    };
    // North + West stay together, South and East are alone.
    assert_eq!(into.len(), 3);
    assert_eq!(
        host.members_of(0, 0, -1),
        cells(&[(0, 0, -1), (-1, 0, -1), (-1, 0, 0)])
    );
    assert_eq!(host.members_of(0, 0, 1), cells(&[(0, 0, 1)]));
    assert_eq!(host.members_of(1, 0, 0), cells(&[(1, 0, 0)]));
    host.assert_consistent();
}

#[test]
fn vertical_cut_splits_column() {
    let mut host = Host::new();
    for y in 0..4 {
        host.place(0, y, 0);
    }
    host.remove(0, 1, 0);
    assert_eq!(host.members_of(0, 0, 0), cells(&[(0, 0, 0)]));
    assert_eq!(host.members_of(0, 3, 0), cells(&[(0, 2, 0), (0, 3, 0)]));
    host.assert_consistent();
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

#[test]
fn bounding_box_follows_additions_and_boundary_removal() {
    let mut group = PipeGroup::new();
    group.add_member(GridPos::new(0, 0, 0));
    group.add_member(GridPos::new(1, 0, 0));
    group.add_member(GridPos::new(0, 2, 0));
    assert_eq!(group.min_bound(), Some(GridPos::new(0, 0, 0)));
    assert_eq!(group.max_bound(), Some(GridPos::new(1, 2, 0)));

    group.remove_member(GridPos::new(0, 2, 0));
    assert_eq!(group.max_bound(), Some(GridPos::new(1, 0, 0)));
}

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

#[test]
fn reused_slot_does_not_resurrect_old_id() {
    let mut host = Host::new();
    let old = host.place(0, 0, 0).group();
    assert_eq!(host.remove(0, 0, 0), RemoveOutcome::Destroyed(old));

    let new = host.place(7, 7, 7).group();
    // Same slot, new generation.
    assert_eq!(new.index(), old.index());
    assert_ne!(new.generation(), old.generation());
    assert!(host.net.group(old).is_none());
    assert_eq!(host.members_of(7, 7, 7), cells(&[(7, 7, 7)]));
}

#[test]
fn duplicate_placement_changes_nothing() {
    let mut host = Host::new();
    host.place(0, 0, 0);
    host.place(1, 0, 0);
    let before = host.net.capture_snapshot();
    let id = host.net.group_of(GridPos::ZERO).unwrap();
    assert_eq!(host.place(1, 0, 0), AddOutcome::AlreadyAssigned(id));
    assert_eq!(host.net.capture_snapshot(), before);
}

#[test]
fn independent_networks_do_not_share_state() {
    let mut a = Host::new();
    let mut b = Host::new();
    a.place(0, 0, 0);
    a.place(1, 0, 0);
    b.place(5, 5, 5);
    assert_eq!(a.net.cell_count(), 2);
    assert_eq!(b.net.cell_count(), 1);
    assert!(!b.net.is_tracked(GridPos::ZERO));
}

#[test]
fn highlight_mesh_is_built_from_members() {
    let mut host = Host::new();
    for x in 0..3 {
        host.place(x, 0, 0);
    }
    let group = host.net.group_at(GridPos::ZERO).unwrap();
    let mesh = build_highlight_mesh(group, 0.02);
    // 3 cells * 6 faces - 2 shared pairs * 2 faces.
    assert_eq!(mesh.quad_count(), 14);
}
