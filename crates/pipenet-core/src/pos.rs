//! Grid coordinates and face directions.
//!
//! A [`GridPos`] names one cell of the block grid. Pipes connect across the six
//! axis-aligned faces of a cell, enumerated by [`Face`] in a fixed order so that
//! every traversal built on top of them is deterministic.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Face
// ---------------------------------------------------------------------------

/// One of the six faces of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Face {
    /// Towards negative Z.
    North,
    /// Towards positive Z.
    South,
    /// Towards negative X.
    West,
    /// Towards positive X.
    East,
    /// Towards positive Y.
    Up,
    /// Towards negative Y.
    Down,
}

impl Face {
    /// All faces, in neighbor enumeration order.
    pub const ALL: [Face; 6] = [
        Face::North,
        Face::South,
        Face::West,
        Face::East,
        Face::Up,
        Face::Down,
    ];

    /// Unit offset from a cell to its neighbor across this face.
    pub fn offset(self) -> GridPos {
        match self {
            Face::North => GridPos::new(0, 0, -1),
            Face::South => GridPos::new(0, 0, 1),
            Face::West => GridPos::new(-1, 0, 0),
            Face::East => GridPos::new(1, 0, 0),
            Face::Up => GridPos::new(0, 1, 0),
            Face::Down => GridPos::new(0, -1, 0),
        }
    }

    /// The face pointing the other way.
    pub fn opposite(self) -> Face {
        match self {
            Face::North => Face::South,
            Face::South => Face::North,
            Face::West => Face::East,
            Face::East => Face::West,
            Face::Up => Face::Down,
            Face::Down => Face::Up,
        }
    }
}

// ---------------------------------------------------------------------------
// GridPos
// ---------------------------------------------------------------------------

/// An integer grid coordinate.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridPos {
    /// The origin cell.
    pub const ZERO: GridPos = GridPos::new(0, 0, 0);

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The neighboring cell across `face`.
    #[inline]
    pub fn offset_by_face(self, face: Face) -> GridPos {
        self + face.offset()
    }

    /// The six face neighbors, in [`Face::ALL`] order.
    pub fn neighbors(self) -> impl Iterator<Item = (Face, GridPos)> {
        Face::ALL
            .into_iter()
            .map(move |face| (face, self.offset_by_face(face)))
    }

    /// Component-wise minimum.
    pub fn min(self, other: GridPos) -> GridPos {
        GridPos::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Component-wise maximum.
    pub fn max(self, other: GridPos) -> GridPos {
        GridPos::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }
}

impl Add for GridPos {
    type Output = GridPos;

    fn add(self, rhs: GridPos) -> GridPos {
        GridPos::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for GridPos {
    type Output = GridPos;

    fn sub(self, rhs: GridPos) -> GridPos {
        GridPos::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<i32> for GridPos {
    type Output = GridPos;

    fn mul(self, rhs: i32) -> GridPos {
        GridPos::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for GridPos {
    type Output = GridPos;

    fn neg(self) -> GridPos {
        GridPos::new(-self.x, -self.y, -self.z)
    }
}

impl From<(i32, i32, i32)> for GridPos {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        GridPos::new(x, y, z)
    }
}

impl fmt::Debug for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GridPos({}, {}, {})", self.x, self.y, self.z)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn face_offsets_match_axis_convention() {
        let p = GridPos::new(5, 5, 5);
        assert_eq!(p.offset_by_face(Face::North), GridPos::new(5, 5, 4));
        assert_eq!(p.offset_by_face(Face::South), GridPos::new(5, 5, 6));
        assert_eq!(p.offset_by_face(Face::West), GridPos::new(4, 5, 5));
        assert_eq!(p.offset_by_face(Face::East), GridPos::new(6, 5, 5));
        assert_eq!(p.offset_by_face(Face::Up), GridPos::new(5, 6, 5));
        assert_eq!(p.offset_by_face(Face::Down), GridPos::new(5, 4, 5));
    }

    #[test]
    fn opposite_faces_cancel() {
        for face in Face::ALL {
            assert_eq!(face.offset() + face.opposite().offset(), GridPos::ZERO);
            assert_eq!(face.opposite().opposite(), face);
        }
    }

    #[test]
    fn neighbors_follow_fixed_order() {
        let faces: Vec<Face> = GridPos::ZERO.neighbors().map(|(f, _)| f).collect();
        assert_eq!(faces, Face::ALL.to_vec());
        let unique: HashSet<GridPos> = GridPos::ZERO.neighbors().map(|(_, p)| p).collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn arithmetic() {
        let a = GridPos::new(1, -2, 3);
        let b = GridPos::new(4, 5, -6);
        assert_eq!(a + b, GridPos::new(5, 3, -3));
        assert_eq!(a - b, GridPos::new(-3, -7, 9));
        assert_eq!(a * 3, GridPos::new(3, -6, 9));
        assert_eq!(-a, GridPos::new(-1, 2, -3));
        assert_eq!(a.min(b), GridPos::new(1, -2, -6));
        assert_eq!(a.max(b), GridPos::new(4, 5, 3));
    }

    #[test]
    fn equal_positions_hash_equal() {
        let mut set = HashSet::new();
        set.insert(GridPos::new(1, 2, 3));
        assert!(set.contains(&GridPos::from((1, 2, 3))));
        assert!(!set.contains(&GridPos::new(3, 2, 1)));
    }
}
