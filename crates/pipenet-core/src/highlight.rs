//! Outline mesh for highlighting a group.
//!
//! Built from a group's finished member set, never from inside a connectivity
//! flood fill, so nothing a renderer wants can influence group membership.
//! One quad is emitted for each member face that does not touch another
//! member, which yields the hull of the group (internal faces are culled).

use crate::group::PipeGroup;
use crate::pos::{Face, GridPos};

/// Triangle mesh in world units: cell `(x, y, z)` spans `[x, x + 1]` on each
/// axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl HighlightMesh {
    /// Number of emitted quads.
    pub fn quad_count(&self) -> usize {
        self.positions.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Tangent axes `(u, v)` with `u x v` pointing out of the face, so corners
/// listed as `-u-v, +u-v, +u+v, -u+v` wind counter-clockwise seen from outside.
fn tangents(face: Face) -> (GridPos, GridPos) {
    let x = GridPos::new(1, 0, 0);
    let y = GridPos::new(0, 1, 0);
    let z = GridPos::new(0, 0, 1);
    match face {
        Face::East => (y, z),
        Face::West => (z, y),
        Face::Up => (z, x),
        Face::Down => (x, z),
        Face::South => (x, y),
        Face::North => (y, x),
    }
}

fn as_vec(pos: GridPos) -> [f32; 3] {
    [pos.x as f32, pos.y as f32, pos.z as f32]
}

/// Build the hull mesh of `group`, pushed outwards by `inflate` world units so
/// it does not z-fight with the pipe geometry.
pub fn build_highlight_mesh(group: &PipeGroup, inflate: f32) -> HighlightMesh {
    let mut mesh = HighlightMesh::default();
    let half = 0.5 + inflate;

    for pos in group.sorted_members() {
        let centre = as_vec(pos).map(|c| c + 0.5);
        for face in Face::ALL {
            if group.contains(pos.offset_by_face(face)) {
                continue;
            }
            let normal = as_vec(face.offset());
            let (u, v) = tangents(face);
            let (u, v) = (as_vec(u), as_vec(v));

            let base = mesh.positions.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let corner: [f32; 3] = std::array::from_fn(|i| {
                    centre[i] + (normal[i] + su * u[i] + sv * v[i]) * half
                });
                mesh.positions.push(corner);
                mesh.normals.push(normal);
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }

    mesh
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cell_has_six_quads() {
        let group = PipeGroup::from_cells([GridPos::ZERO]);
        let mesh = build_highlight_mesh(&group, 0.0);
        assert_eq!(mesh.quad_count(), 6);
        assert_eq!(mesh.indices.len(), 36);
        for corner in &mesh.positions {
            for c in corner {
                assert!(*c == 0.0 || *c == 1.0, "corner {corner:?} off the unit cube");
            }
        }
    }

    #[test]
    fn shared_faces_are_culled() {
        let group = PipeGroup::from_cells([GridPos::ZERO, GridPos::new(1, 0, 0)]);
        let mesh = build_highlight_mesh(&group, 0.0);
        assert_eq!(mesh.quad_count(), 10);
    }

    #[test]
    fn inflate_pushes_corners_out() {
        let group = PipeGroup::from_cells([GridPos::ZERO]);
        let mesh = build_highlight_mesh(&group, 0.1);
        let max = mesh
            .positions
            .iter()
            .flat_map(|c| c.iter().copied())
            .fold(f32::MIN, f32::max);
        assert!((max - 1.1).abs() < 1e-6);
    }

    #[test]
    fn quads_face_outwards() {
        let group = PipeGroup::from_cells([GridPos::ZERO]);
        let mesh = build_highlight_mesh(&group, 0.0);
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| mesh.positions[tri[i] as usize]);
            let e1: [f32; 3] = std::array::from_fn(|i| b[i] - a[i]);
            let e2: [f32; 3] = std::array::from_fn(|i| c[i] - a[i]);
            let cross = [
                e1[1] * e2[2] - e1[2] * e2[1],
                e1[2] * e2[0] - e1[0] * e2[2],
                e1[0] * e2[1] - e1[1] * e2[0],
            ];
            let n = mesh.normals[tri[0] as usize];
            let dot: f32 = (0..3).map(|i| cross[i] * n[i]).sum();
            assert!(dot > 0.0, "triangle {tri:?} winds inwards");
        }
    }

    #[test]
    fn empty_group_gives_empty_mesh() {
        assert!(build_highlight_mesh(&PipeGroup::new(), 0.05).is_empty());
    }
}
