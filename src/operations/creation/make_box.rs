use crate::error::{GeometryError, Result};
use crate::math::Point3;
use crate::topology::{FaceUseId, Model, ShellId, VertexId};

use super::MakeFace;

/// Corner indices of each box face, counter-clockwise seen from outside.
///
/// Corner `i` sits at `x = bit 0`, `y = bit 1`, `z = bit 2` of `i`.
const BOX_FACES: [[usize; 4]; 6] = [
    [0, 2, 3, 1], // bottom (z = min)
    [4, 5, 7, 6], // top (z = max)
    [0, 1, 5, 4], // front (y = min)
    [2, 6, 7, 3], // back (y = max)
    [0, 4, 6, 2], // left (x = min)
    [1, 3, 7, 5], // right (x = max)
];

/// Result of [`MakeBox`].
#[derive(Debug, Clone)]
pub struct BoxShell {
    /// The eight corners. Bits 0, 1 and 2 of the index select the max
    /// side along x, y and z.
    pub corners: Vec<VertexId>,
    /// Outward face uses: bottom, top, front, back, left, right.
    pub faces: Vec<FaceUseId>,
}

/// Adds an axis-aligned closed box to a shell.
///
/// Corners that coincide with one of the `sharing` vertices reuse it, so
/// two boxes built this way share the vertices, edges and loop outline of
/// a common face.
pub struct MakeBox {
    shell: ShellId,
    min_corner: Point3,
    max_corner: Point3,
    sharing: Vec<VertexId>,
}

impl MakeBox {
    /// Creates a new `MakeBox` operation.
    #[must_use]
    pub fn new(shell: ShellId, min_corner: Point3, max_corner: Point3) -> Self {
        Self {
            shell,
            min_corner,
            max_corner,
            sharing: Vec::new(),
        }
    }

    /// Reuses existing vertices for coincident corners.
    #[must_use]
    pub fn sharing(mut self, vertices: Vec<VertexId>) -> Self {
        self.sharing = vertices;
        self
    }

    /// Executes the operation, creating six faces in the shell.
    ///
    /// # Errors
    ///
    /// Returns an error if the box is flat along any axis.
    pub fn execute(&self, model: &mut Model) -> Result<BoxShell> {
        let (lo, hi) = (self.min_corner, self.max_corner);
        if hi.x <= lo.x || hi.y <= lo.y || hi.z <= lo.z {
            return Err(GeometryError::Degenerate("box has no volume".into()).into());
        }

        let mut corners = Vec::with_capacity(8);
        for i in 0..8 {
            let point = Point3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
            corners.push(self.corner(model, point)?);
        }

        let mut faces = Vec::with_capacity(BOX_FACES.len());
        for indices in &BOX_FACES {
            let outline = indices.iter().map(|&i| corners[i]).collect();
            faces.push(MakeFace::new(self.shell, outline).execute(model)?);
        }
        Ok(BoxShell { corners, faces })
    }

    fn corner(&self, model: &mut Model, point: Point3) -> Result<VertexId> {
        for &v in &self.sharing {
            if model.vertex(v)?.point == point {
                return Ok(v);
            }
        }
        Ok(model.add_vertex(point))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn faces_point_outward() {
        let mut model = Model::new();
        let shell = model.add_shell();
        let cube = MakeBox::new(shell, p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
            .execute(&mut model)
            .unwrap();

        let expected = [
            (0.0, 0.0, -1.0),
            (0.0, 0.0, 1.0),
            (0.0, -1.0, 0.0),
            (0.0, 1.0, 0.0),
            (-1.0, 0.0, 0.0),
            (1.0, 0.0, 0.0),
        ];
        for (&fu, (x, y, z)) in cube.faces.iter().zip(expected) {
            let n = *model.face_use_plane(fu).unwrap().normal();
            assert_relative_eq!(n.x, x);
            assert_relative_eq!(n.y, y);
            assert_relative_eq!(n.z, z);
            assert!(!model.is_dangling(fu).unwrap());
        }
        assert_relative_eq!(model.shell(shell).unwrap().bbox.diagonal(), 3.0_f64.sqrt());
    }

    #[test]
    fn radial_links_adjacent_faces() {
        let mut model = Model::new();
        let shell = model.add_shell();
        let cube = MakeBox::new(shell, p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
            .execute(&mut model)
            .unwrap();

        for &fu in &cube.faces {
            for &lu in &model.face_use(fu).unwrap().loops {
                let crate::topology::LoopChildren::Edges(edges) = &model.loop_use(lu).unwrap().children
                else {
                    panic!("expected an edge loop");
                };
                for &eu in edges {
                    let radial = model.radial(eu).unwrap();
                    let other = model.face_use_of(radial).unwrap().unwrap();
                    assert_ne!(model.face_use(other).unwrap().face, model.face_use(fu).unwrap().face);
                    // both uses face the outside of the box
                    assert_eq!(
                        model.face_use(other).unwrap().orientation,
                        crate::topology::Orientation::Same
                    );
                    assert_eq!(model.radial(radial).unwrap(), eu);
                }
            }
        }
    }

    #[test]
    fn shared_corners_share_edges() {
        let mut model = Model::new();
        let a = model.add_shell();
        let b = model.add_shell();
        let left = MakeBox::new(a, p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
            .execute(&mut model)
            .unwrap();
        let right = MakeBox::new(b, p(1.0, 0.0, 0.0), p(2.0, 1.0, 1.0))
            .sharing(left.corners.clone())
            .execute(&mut model)
            .unwrap();

        assert_eq!(right.corners[0], left.corners[1]);
        assert_eq!(right.corners[6], left.corners[7]);
        assert_ne!(right.corners[1], left.corners[1]);
        let edge = model.edge_between(left.corners[1], left.corners[3]).unwrap();
        assert_eq!(model.edge(edge).unwrap().uses.len(), 8);
    }

    #[test]
    fn flat_box_is_rejected() {
        let mut model = Model::new();
        let shell = model.add_shell();
        assert!(MakeBox::new(shell, p(0.0, 0.0, 0.0), p(1.0, 0.0, 1.0))
            .execute(&mut model)
            .is_err());
    }
}
