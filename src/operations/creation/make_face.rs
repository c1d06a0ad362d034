use crate::error::{GeometryError, Result, TopologyError};
use crate::math::{newell_normal, Aabb, PlaneEquation, Point3};
use crate::topology::{
    EdgeId, EdgeUseParent, FaceData, FaceGeometryId, FaceUseData, FaceUseId, LoopChildren,
    LoopData, LoopUseData, LoopUseId, LoopUseParent, Model, Orientation, ShellId, VertexId,
    VertexUseParent,
};

/// Creates a planar face bounded by a loop of vertices.
///
/// Both face uses are created, the `Same` one first. The loop is wound
/// counter-clockwise about the face normal, so the vertex order decides
/// the normal unless the face is placed on an existing plane record.
pub struct MakeFace {
    shell: ShellId,
    outer: Vec<VertexId>,
    geometry: Option<(FaceGeometryId, bool)>,
}

impl MakeFace {
    /// Creates a new `MakeFace` operation.
    #[must_use]
    pub fn new(shell: ShellId, outer: Vec<VertexId>) -> Self {
        Self {
            shell,
            outer,
            geometry: None,
        }
    }

    /// Places the face on an existing plane record, optionally flipped.
    ///
    /// The outer loop is rewound if its vertex order disagrees with the
    /// resulting face normal.
    #[must_use]
    pub fn on_geometry(mut self, geometry: FaceGeometryId, flip: bool) -> Self {
        self.geometry = Some((geometry, flip));
        self
    }

    /// Executes the operation, returning the outward (`Same`) face use.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop has fewer than three vertices, repeats a
    /// vertex consecutively, or encloses no area.
    pub fn execute(&self, model: &mut Model) -> Result<FaceUseId> {
        model.shell(self.shell)?;
        let points = vertex_points(model, &self.outer)?;
        if points.len() < 3 {
            return Err(GeometryError::Degenerate(format!(
                "face boundary with {} vertices",
                points.len()
            ))
            .into());
        }

        let mut outer = self.outer.clone();
        let (geometry, flip) = if let Some((geometry, flip)) = self.geometry {
            let plane = model.face_geometry(geometry)?.plane;
            let normal = if flip { -plane.normal() } else { *plane.normal() };
            if newell_normal(&points).dot(&normal) < 0.0 {
                outer.reverse();
            }
            (geometry, flip)
        } else {
            let plane = PlaneEquation::from_polygon(&points)?;
            (model.add_face_geometry(plane), false)
        };

        let face = model.add_face(FaceData { geometry, flip });
        let fu = model.add_face_use(FaceUseData {
            face,
            mate: FaceUseId::default(),
            orientation: Orientation::Same,
            shell: self.shell,
            loops: Vec::new(),
        });
        let fu_mate = model.add_face_use(FaceUseData {
            face,
            mate: fu,
            orientation: Orientation::Opposite,
            shell: self.shell,
            loops: Vec::new(),
        });
        model.face_use_mut(fu)?.mate = fu_mate;

        let (lu, lu_mate, edges) = add_loop_pair(
            model,
            (LoopUseParent::Face(fu), LoopUseParent::Face(fu_mate)),
            &outer,
            Orientation::Same,
        )?;
        model.face_use_mut(fu)?.loops.push(lu);
        model.face_use_mut(fu_mate)?.loops.push(lu_mate);

        let shell = model.shell_mut(self.shell)?;
        shell.face_uses.push(fu);
        shell.face_uses.push(fu_mate);
        model.extend_shell_bbox(self.shell, &outer)?;
        for edge in edges {
            model.relink_radials(edge)?;
        }
        Ok(fu)
    }
}

/// Adds an inner loop to an existing face.
///
/// Holes are `Opposite` and wound clockwise about the face normal; a
/// single vertex makes a vertex loop. The loop goes on the `Same` face use
/// and its mate on the other one, whichever use is passed in.
pub struct MakeFaceLoop {
    face_use: FaceUseId,
    vertices: Vec<VertexId>,
    orientation: Orientation,
}

impl MakeFaceLoop {
    /// Creates a new `MakeFaceLoop` operation adding a hole.
    #[must_use]
    pub fn new(face_use: FaceUseId, vertices: Vec<VertexId>) -> Self {
        Self {
            face_use,
            vertices,
            orientation: Orientation::Opposite,
        }
    }

    /// Overrides the loop orientation.
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Executes the operation, returning the loop use on the `Same` side.
    ///
    /// # Errors
    ///
    /// Returns an error if the face use is missing, the orientation is
    /// `Unspecified`, or the loop has two vertices.
    pub fn execute(&self, model: &mut Model) -> Result<LoopUseId> {
        if self.orientation == Orientation::Unspecified {
            return Err(TopologyError::InvalidTopology(
                "face loops need an orientation".into(),
            )
            .into());
        }
        let data = model.face_use(self.face_use)?;
        let (fu, fu_mate) = if data.orientation == Orientation::Same {
            (self.face_use, data.mate)
        } else {
            (data.mate, self.face_use)
        };
        let shell = data.shell;

        let mut vertices = self.vertices.clone();
        if vertices.len() > 2 {
            let normal = *model.face_plane(data.face)?.normal();
            let winding = newell_normal(&vertex_points(model, &vertices)?).dot(&normal);
            let want_ccw = self.orientation == Orientation::Same;
            if (winding > 0.0) != want_ccw {
                vertices.reverse();
            }
        }

        let (lu, lu_mate, edges) = add_loop_pair(
            model,
            (LoopUseParent::Face(fu), LoopUseParent::Face(fu_mate)),
            &vertices,
            self.orientation,
        )?;
        model.face_use_mut(fu)?.loops.push(lu);
        model.face_use_mut(fu_mate)?.loops.push(lu_mate);
        model.extend_shell_bbox(shell, &vertices)?;
        for edge in edges {
            model.relink_radials(edge)?;
        }
        Ok(lu)
    }
}

pub(crate) fn vertex_points(model: &Model, vertices: &[VertexId]) -> Result<Vec<Point3>> {
    let mut points = Vec::with_capacity(vertices.len());
    for &v in vertices {
        points.push(model.vertex(v)?.point);
    }
    Ok(points)
}

/// Creates a loop with both of its uses.
///
/// The first use runs through `vertices` in order; its mate runs the
/// other way. Returns the two uses and the edges they touch, which still
/// need their radial rings relinked.
pub(crate) fn add_loop_pair(
    model: &mut Model,
    parents: (LoopUseParent, LoopUseParent),
    vertices: &[VertexId],
    orientation: Orientation,
) -> Result<(LoopUseId, LoopUseId, Vec<EdgeId>)> {
    if vertices.is_empty() || vertices.len() == 2 {
        return Err(GeometryError::Degenerate(format!(
            "loop with {} vertices",
            vertices.len()
        ))
        .into());
    }
    let points = vertex_points(model, vertices)?;
    let lp = model.add_loop(LoopData {
        bbox: Aabb::from_points(&points),
    });
    let lu = model.add_loop_use(LoopUseData {
        lp,
        mate: LoopUseId::default(),
        orientation,
        parent: parents.0,
        children: LoopChildren::Edges(Vec::new()),
    });
    let lu_mate = model.add_loop_use(LoopUseData {
        lp,
        mate: lu,
        orientation,
        parent: parents.1,
        children: LoopChildren::Edges(Vec::new()),
    });
    model.loop_use_mut(lu)?.mate = lu_mate;

    if let [v] = vertices {
        let vu = model.add_vertex_use(*v, VertexUseParent::Loop(lu))?;
        let vu_mate = model.add_vertex_use(*v, VertexUseParent::Loop(lu_mate))?;
        model.loop_use_mut(lu)?.children = LoopChildren::Vertex(vu);
        model.loop_use_mut(lu_mate)?.children = LoopChildren::Vertex(vu_mate);
        return Ok((lu, lu_mate, Vec::new()));
    }

    let count = vertices.len();
    let mut uses = Vec::with_capacity(count);
    let mut mates = Vec::with_capacity(count);
    let mut edges = Vec::with_capacity(count);
    for (&start, &end) in vertices.iter().zip(vertices.iter().cycle().skip(1)) {
        if start == end {
            return Err(TopologyError::InvalidTopology("loop repeats a vertex".into()).into());
        }
        let edge = model.find_or_add_edge(start, end);
        if edges.contains(&edge) {
            return Err(TopologyError::InvalidTopology("loop uses an edge twice".into()).into());
        }
        let eu = model.add_edge_use(edge, start, EdgeUseParent::Loop(lu))?;
        let eu_mate = model.add_edge_use(edge, end, EdgeUseParent::Loop(lu_mate))?;
        model.edge_use_mut(eu)?.mate = eu_mate;
        model.edge_use_mut(eu_mate)?.mate = eu;
        uses.push(eu);
        mates.push(eu_mate);
        edges.push(edge);
    }
    mates.reverse();
    model.loop_use_mut(lu)?.children = LoopChildren::Edges(uses);
    model.loop_use_mut(lu_mate)?.children = LoopChildren::Edges(mates);
    Ok((lu, lu_mate, edges))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn square(model: &mut Model) -> Vec<VertexId> {
        [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)]
            .into_iter()
            .map(|pt| model.add_vertex(pt))
            .collect()
    }

    #[test]
    fn face_has_mated_uses() {
        let mut model = Model::new();
        let shell = model.add_shell();
        let verts = square(&mut model);
        let fu = MakeFace::new(shell, verts).execute(&mut model).unwrap();

        let data = model.face_use(fu).unwrap();
        assert_eq!(data.orientation, Orientation::Same);
        let mate = model.face_use(data.mate).unwrap();
        assert_eq!(mate.orientation, Orientation::Opposite);
        assert_eq!(mate.mate, fu);
        assert_eq!(model.shell(shell).unwrap().face_uses, vec![fu, data.mate]);
        assert_relative_eq!(model.face_normal(data.face).unwrap().z, 1.0);
    }

    #[test]
    fn mate_loop_runs_backwards() {
        let mut model = Model::new();
        let shell = model.add_shell();
        let verts = square(&mut model);
        let fu = MakeFace::new(shell, verts.clone()).execute(&mut model).unwrap();

        let lu = model.face_use(fu).unwrap().loops[0];
        let lu_mate = model.loop_use(lu).unwrap().mate;
        let LoopChildren::Edges(edges) = &model.loop_use(lu_mate).unwrap().children else {
            panic!("expected an edge loop");
        };
        let starts: Vec<_> = edges
            .iter()
            .map(|&eu| model.edge_use_start(eu).unwrap())
            .collect();
        assert_eq!(starts, vec![verts[0], verts[3], verts[2], verts[1]]);
        for &eu in edges {
            assert_eq!(model.mate(model.mate(eu).unwrap()).unwrap(), eu);
            // a lone face: the only other face use around each edge is the mate
            assert_eq!(model.radial(eu).unwrap(), model.mate(eu).unwrap());
        }
        assert!(model.is_dangling(fu).unwrap());
    }

    #[test]
    fn shared_geometry_rewinds_loop() {
        let mut model = Model::new();
        let shell = model.add_shell();
        let plane = PlaneEquation::from_polygon(&[p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(1.0, 0.0, 0.0)])
            .unwrap();
        let geometry = model.add_face_geometry(plane);
        let verts = square(&mut model);
        let fu = MakeFace::new(shell, verts.clone())
            .on_geometry(geometry, false)
            .execute(&mut model)
            .unwrap();

        let face = model.face_use(fu).unwrap().face;
        assert_relative_eq!(model.face_normal(face).unwrap().z, -1.0);
        let lu = model.face_use(fu).unwrap().loops[0];
        let LoopChildren::Edges(edges) = &model.loop_use(lu).unwrap().children else {
            panic!("expected an edge loop");
        };
        assert_eq!(model.edge_use_start(edges[0]).unwrap(), verts[3]);
    }

    #[test]
    fn hole_is_wound_against_the_face() {
        let mut model = Model::new();
        let shell = model.add_shell();
        let verts = square(&mut model);
        let fu = MakeFace::new(shell, verts).execute(&mut model).unwrap();
        let hole: Vec<_> = [p(0.25, 0.25, 0.0), p(0.75, 0.25, 0.0), p(0.5, 0.75, 0.0)]
            .into_iter()
            .map(|pt| model.add_vertex(pt))
            .collect();
        let fu_mate = model.face_use(fu).unwrap().mate;
        let lu = MakeFaceLoop::new(fu_mate, hole).execute(&mut model).unwrap();

        assert_eq!(model.loop_use(lu).unwrap().orientation, Orientation::Opposite);
        assert_eq!(model.face_use(fu).unwrap().loops.len(), 2);
        let LoopChildren::Edges(edges) = &model.loop_use(lu).unwrap().children else {
            panic!("expected an edge loop");
        };
        // left of a hole edge points away from the hole
        let left = model.left_vector(edges[1]).unwrap();
        assert_relative_eq!(left.y, -1.0);
    }

    #[test]
    fn single_vertex_makes_a_vertex_loop() {
        let mut model = Model::new();
        let shell = model.add_shell();
        let verts = square(&mut model);
        let fu = MakeFace::new(shell, verts).execute(&mut model).unwrap();
        let v = model.add_vertex(p(0.5, 0.5, 0.0));
        let lu = MakeFaceLoop::new(fu, vec![v])
            .with_orientation(Orientation::Same)
            .execute(&mut model)
            .unwrap();
        assert!(matches!(
            model.loop_use(lu).unwrap().children,
            LoopChildren::Vertex(_)
        ));
        assert_eq!(model.vertex(v).unwrap().uses.len(), 2);
    }

    #[test]
    fn degenerate_boundaries_are_rejected() {
        let mut model = Model::new();
        let shell = model.add_shell();
        let a = model.add_vertex(p(0.0, 0.0, 0.0));
        let b = model.add_vertex(p(1.0, 0.0, 0.0));
        let c = model.add_vertex(p(2.0, 0.0, 0.0));
        assert!(MakeFace::new(shell, vec![a, b]).execute(&mut model).is_err());
        assert!(MakeFace::new(shell, vec![a, b, c]).execute(&mut model).is_err());
        assert!(MakeFace::new(shell, vec![a, b, b]).execute(&mut model).is_err());
    }
}
