//! Navigation of mate and radial rings, and upkeep of the radial order.

use std::f64::consts::TAU;

use slotmap::SecondaryMap;

use crate::error::{GeometryError, TopologyError};
use crate::math::{PlaneEquation, Point3, Vector3, ZERO_LENGTH};

use super::{
    EdgeId, EdgeUseId, EdgeUseParent, FaceId, FaceUseId, LoopChildren, LoopUseId, LoopUseParent,
    Model, Orientation, ShellId, VertexId, VertexUseId, VertexUseParent,
};

/// Angular bucket width used to detect coincident faces around an edge.
const ANGLE_QUANTUM: f64 = 1e-9;

/// One face's pair of uses around an edge, placed by angle.
struct Wing {
    /// Use whose face normal points toward increasing angle.
    plus: EdgeUseId,
    minus: EdgeUseId,
    angle: i64,
    tie: u8,
}

impl Model {
    /// Returns the mate of an edge use.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge use is missing.
    pub fn mate(&self, eu: EdgeUseId) -> Result<EdgeUseId, TopologyError> {
        Ok(self.edge_use(eu)?.mate)
    }

    /// Returns the radial neighbor of an edge use.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge use is missing.
    pub fn radial(&self, eu: EdgeUseId) -> Result<EdgeUseId, TopologyError> {
        Ok(self.edge_use(eu)?.radial)
    }

    /// Returns the vertex an edge use starts at.
    ///
    /// # Errors
    ///
    /// Returns an error if any element on the way is missing.
    pub fn edge_use_start(&self, eu: EdgeUseId) -> Result<VertexId, TopologyError> {
        Ok(self.vertex_use(self.edge_use(eu)?.vertex_use)?.vertex)
    }

    /// Returns the start and end positions of an edge use.
    ///
    /// # Errors
    ///
    /// Returns an error if any element on the way is missing.
    pub fn edge_use_points(&self, eu: EdgeUseId) -> Result<(Point3, Point3), TopologyError> {
        let data = self.edge_use(eu)?;
        let start = self.vertex_use_point(data.vertex_use)?;
        let end = self.vertex_use_point(self.edge_use(data.mate)?.vertex_use)?;
        Ok((start, end))
    }

    /// Returns the loop use holding an edge use, if it is in a loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge use is missing.
    pub fn loop_use_of(&self, eu: EdgeUseId) -> Result<Option<LoopUseId>, TopologyError> {
        Ok(match self.edge_use(eu)?.parent {
            EdgeUseParent::Loop(lu) => Some(lu),
            EdgeUseParent::Shell(_) => None,
        })
    }

    /// Returns the face use bounded by a loop use, if it is not a wire loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop use is missing.
    pub fn face_use_of_loop(&self, lu: LoopUseId) -> Result<Option<FaceUseId>, TopologyError> {
        Ok(match self.loop_use(lu)?.parent {
            LoopUseParent::Face(fu) => Some(fu),
            LoopUseParent::Shell(_) => None,
        })
    }

    /// Returns the face use an edge use bounds, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if any element on the way is missing.
    pub fn face_use_of(&self, eu: EdgeUseId) -> Result<Option<FaceUseId>, TopologyError> {
        match self.loop_use_of(eu)? {
            Some(lu) => self.face_use_of_loop(lu),
            None => Ok(None),
        }
    }

    /// Returns the shell a loop use belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if any element on the way is missing.
    pub fn shell_of_loop_use(&self, lu: LoopUseId) -> Result<ShellId, TopologyError> {
        Ok(match self.loop_use(lu)?.parent {
            LoopUseParent::Face(fu) => self.face_use(fu)?.shell,
            LoopUseParent::Shell(s) => s,
        })
    }

    /// Returns the shell an edge use belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if any element on the way is missing.
    pub fn shell_of_edge_use(&self, eu: EdgeUseId) -> Result<ShellId, TopologyError> {
        match self.edge_use(eu)?.parent {
            EdgeUseParent::Loop(lu) => self.shell_of_loop_use(lu),
            EdgeUseParent::Shell(s) => Ok(s),
        }
    }

    /// Returns the shell a vertex use belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if any element on the way is missing.
    pub fn shell_of_vertex_use(&self, vu: VertexUseId) -> Result<ShellId, TopologyError> {
        match self.vertex_use(vu)?.parent {
            VertexUseParent::Loop(lu) => self.shell_of_loop_use(lu),
            VertexUseParent::Edge(eu) => self.shell_of_edge_use(eu),
            VertexUseParent::Shell(s) => Ok(s),
        }
    }

    /// Returns the edge use following `eu` in its loop.
    ///
    /// # Errors
    ///
    /// Returns an error if `eu` is not part of an edge loop.
    pub fn next_in_loop(&self, eu: EdgeUseId) -> Result<EdgeUseId, TopologyError> {
        let lu = self.loop_use_of(eu)?.ok_or_else(|| {
            TopologyError::InvalidTopology("wire edge use has no successor".into())
        })?;
        let LoopChildren::Edges(edges) = &self.loop_use(lu)?.children else {
            return Err(TopologyError::InvalidTopology(
                "edge use parent loop holds a vertex".into(),
            ));
        };
        let pos = edges
            .iter()
            .position(|&e| e == eu)
            .ok_or_else(|| TopologyError::InvalidTopology("edge use missing from its loop".into()))?;
        Ok(edges[(pos + 1) % edges.len()])
    }

    /// Returns the next use radially around the edge that bounds a face,
    /// skipping wire uses.
    ///
    /// For an edge used by a single face this is the mate of `eu`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ring has no face use or is corrupt.
    pub fn face_radial(&self, eu: EdgeUseId) -> Result<EdgeUseId, TopologyError> {
        self.radial_face_edge_use(eu, |_| true)
    }

    fn radial_face_edge_use(
        &self,
        eu: EdgeUseId,
        accept: impl Fn(FaceUseId) -> bool,
    ) -> Result<EdgeUseId, TopologyError> {
        let limit = self.edge(self.edge_use(eu)?.edge)?.uses.len();
        let mut eur = self.radial(eu)?;
        for _ in 0..=limit {
            if let Some(fu) = self.face_use_of(eur)? {
                if accept(fu) {
                    return Ok(eur);
                }
            }
            eur = self.radial(self.mate(eur)?)?;
        }
        Err(TopologyError::InvalidTopology(
            "radial ring has no face use".into(),
        ))
    }

    /// Returns `true` if some edge of the face use has no other face of the
    /// same shell radially, so the face does not help enclose a volume.
    ///
    /// # Errors
    ///
    /// Returns an error if any element on the way is missing.
    pub fn is_dangling(&self, fu: FaceUseId) -> Result<bool, TopologyError> {
        let data = self.face_use(fu)?;
        let shell = data.shell;
        let same_shell = |other: FaceUseId| self.face_use(other).is_ok_and(|d| d.shell == shell);
        for &lu in &data.loops {
            let LoopChildren::Edges(edges) = &self.loop_use(lu)?.children else {
                continue;
            };
            for &eu in edges {
                if self.radial_face_edge_use(eu, same_shell)? == self.mate(eu)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Returns the outward normal of a face, honouring its flip flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or its geometry is missing.
    pub fn face_normal(&self, face: FaceId) -> Result<Vector3, TopologyError> {
        Ok(*self.face_plane(face)?.normal())
    }

    /// Returns the plane of a face, oriented by its flip flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or its geometry is missing.
    pub fn face_plane(&self, face: FaceId) -> Result<PlaneEquation, TopologyError> {
        let data = self.face(face)?;
        let plane = self.face_geometry(data.geometry)?.plane;
        Ok(if data.flip { plane.reversed() } else { plane })
    }

    /// Returns the plane of a face use, with the normal pointing away from
    /// the side this use faces into.
    ///
    /// # Errors
    ///
    /// Returns an error if an element is missing or the face use has no
    /// usable orientation.
    pub fn face_use_plane(&self, fu: FaceUseId) -> Result<PlaneEquation, TopologyError> {
        let data = self.face_use(fu)?;
        let plane = self.face_plane(data.face)?;
        match data.orientation {
            Orientation::Same => Ok(plane),
            Orientation::Opposite => Ok(plane.reversed()),
            Orientation::Unspecified => Err(TopologyError::InvalidTopology(
                "face use without orientation".into(),
            )),
        }
    }

    /// Returns the unit vector lying in the face plane, perpendicular to
    /// `eu`, pointing into the material bounded by its loop.
    ///
    /// The vector points left of the edge direction with respect to the face
    /// use normal. For an outer loop that is the loop interior; for a hole
    /// it is away from the hole.
    ///
    /// # Errors
    ///
    /// Returns an error if `eu` is not in a face loop or has zero length.
    pub fn left_vector(&self, eu: EdgeUseId) -> Result<Vector3, crate::error::ClassifyError> {
        let fu = self.face_use_of(eu)?.ok_or_else(|| {
            TopologyError::InvalidTopology("wire edge use has no left vector".into())
        })?;
        let normal = *self.face_use_plane(fu)?.normal();
        let (start, end) = self.edge_use_points(eu)?;
        let left = normal
            .cross(&(end - start))
            .try_normalize(ZERO_LENGTH)
            .ok_or(GeometryError::ZeroVector)?;
        Ok(left)
    }

    /// Returns every distinct vertex used anywhere in a shell.
    ///
    /// # Errors
    ///
    /// Returns an error if any element on the way is missing.
    pub fn shell_vertices(&self, shell: ShellId) -> Result<Vec<VertexId>, TopologyError> {
        let data = self.shell(shell)?;
        let mut seen: SecondaryMap<VertexId, ()> = SecondaryMap::new();
        let mut out = Vec::new();
        let mut visit = |v: VertexId, out: &mut Vec<VertexId>| {
            if seen.insert(v, ()).is_none() {
                out.push(v);
            }
        };

        let mut loop_uses: Vec<LoopUseId> = data.wire_loops.clone();
        for &fu in &data.face_uses {
            loop_uses.extend(self.face_use(fu)?.loops.iter().copied());
        }
        for lu in loop_uses {
            match &self.loop_use(lu)?.children {
                LoopChildren::Edges(edges) => {
                    for &eu in edges {
                        visit(self.edge_use_start(eu)?, &mut out);
                    }
                }
                LoopChildren::Vertex(vu) => visit(self.vertex_use(*vu)?.vertex, &mut out),
            }
        }
        for &eu in &data.wire_edges {
            visit(self.edge_use_start(eu)?, &mut out);
        }
        if let Some(vu) = data.lone_vertex {
            visit(self.vertex_use(vu)?.vertex, &mut out);
        }
        Ok(out)
    }

    /// Rebuilds the radial ring of an edge, ordering its faces by angle
    /// around the edge.
    ///
    /// Each face contributes the pair (use facing increasing angle, use
    /// facing decreasing angle); consecutive faces are linked across the
    /// wedge between them. Wire uses sort first. Coincident faces are
    /// ordered so that the outward sides of glued faces face each other.
    pub(crate) fn relink_radials(&mut self, edge: EdgeId) -> Result<(), crate::error::ClassifyError> {
        let uses = self.edge(edge)?.uses.clone();
        if uses.len() % 2 != 0 {
            return Err(TopologyError::InvalidTopology("edge uses are not paired".into()).into());
        }
        let Some(&first) = uses.first() else {
            return Ok(());
        };
        let (axis_start, axis_end) = self.edge_use_points(first)?;
        let axis = (axis_end - axis_start)
            .try_normalize(ZERO_LENGTH)
            .ok_or(GeometryError::ZeroVector)?;

        let mut reference: Option<(Vector3, Vector3)> = None;
        let mut wings = Vec::with_capacity(uses.len() / 2);
        for pair in uses.chunks(2) {
            let (eu, mate) = (pair[0], pair[1]);
            let Some(fu) = self.face_use_of(eu)? else {
                wings.push(Wing {
                    plus: eu,
                    minus: mate,
                    angle: i64::MIN,
                    tie: 0,
                });
                continue;
            };
            let (outward, inward) = if self.face_use(fu)?.orientation == Orientation::Same {
                (eu, mate)
            } else {
                (mate, eu)
            };
            let into_face = self.left_vector(outward)?;
            let (ref_dir, ref_side) = *reference.get_or_insert_with(|| (into_face, axis.cross(&into_face)));
            let mut angle = into_face.dot(&ref_side).atan2(into_face.dot(&ref_dir));
            if angle < -ANGLE_QUANTUM {
                angle += TAU;
            } else if angle < 0.0 {
                angle = 0.0;
            }

            let outward_fu = self.face_use_of(outward)?.ok_or_else(|| {
                TopologyError::InvalidTopology("face edge use lost its face".into())
            })?;
            let normal = *self.face_use_plane(outward_fu)?.normal();
            let faces_plus = normal.dot(&axis.cross(&into_face)) > 0.0;
            let (plus, minus, tie) = if faces_plus {
                (outward, inward, 0)
            } else {
                (inward, outward, 1)
            };
            #[allow(clippy::cast_possible_truncation)]
            let angle = (angle / ANGLE_QUANTUM).round() as i64;
            wings.push(Wing {
                plus,
                minus,
                angle,
                tie,
            });
        }

        wings.sort_by_key(|wing| (wing.angle, wing.tie));
        let count = wings.len();
        for (i, wing) in wings.iter().enumerate() {
            let plus = wing.plus;
            let minus = wings[(i + 1) % count].minus;
            self.edge_use_mut(plus)?.radial = minus;
            self.edge_use_mut(minus)?.radial = plus;
        }
        Ok(())
    }
}
