pub mod edge;
pub mod face;
pub mod loops;
pub mod radial;
pub mod shell;
pub mod vertex;

pub use edge::{EdgeData, EdgeId, EdgeUseData, EdgeUseId, EdgeUseParent};
pub use face::{FaceData, FaceGeometry, FaceGeometryId, FaceId, FaceUseData, FaceUseId};
pub use loops::{
    LoopChildren, LoopData, LoopId, LoopUseData, LoopUseId, LoopUseParent, Orientation,
};
pub use shell::{ShellData, ShellId};
pub use vertex::{VertexData, VertexId, VertexUseData, VertexUseId, VertexUseParent};

use std::collections::HashMap;

use crate::error::TopologyError;
use crate::math::{PlaneEquation, Point3};
use slotmap::SlotMap;

/// Central arena that owns every element of a radial-edge model.
///
/// Elements reference each other via typed IDs (generational indices), so
/// mate and radial rings are plain index chases. The classifier only ever
/// reads a `Model`; construction lives in [`crate::operations::creation`].
#[derive(Debug, Default)]
pub struct Model {
    vertices: SlotMap<VertexId, VertexData>,
    vertex_uses: SlotMap<VertexUseId, VertexUseData>,
    edges: SlotMap<EdgeId, EdgeData>,
    edge_uses: SlotMap<EdgeUseId, EdgeUseData>,
    loops: SlotMap<LoopId, LoopData>,
    loop_uses: SlotMap<LoopUseId, LoopUseData>,
    geometries: SlotMap<FaceGeometryId, FaceGeometry>,
    faces: SlotMap<FaceId, FaceData>,
    face_uses: SlotMap<FaceUseId, FaceUseData>,
    shells: SlotMap<ShellId, ShellData>,
    edge_index: HashMap<(VertexId, VertexId), EdgeId>,
}

impl Model {
    /// Creates a new, empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts an unused vertex at `point` and returns its ID.
    pub fn add_vertex(&mut self, point: Point3) -> VertexId {
        self.vertices.insert(VertexData::new(point))
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the model.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    pub(crate) fn vertex_mut(&mut self, id: VertexId) -> Result<&mut VertexData, TopologyError> {
        self.vertices
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Returns a reference to the vertex use data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the model.
    pub fn vertex_use(&self, id: VertexUseId) -> Result<&VertexUseData, TopologyError> {
        self.vertex_uses
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex use".into()))
    }

    /// Inserts a vertex use and registers it with its vertex.
    pub(crate) fn add_vertex_use(
        &mut self,
        vertex: VertexId,
        parent: VertexUseParent,
    ) -> Result<VertexUseId, TopologyError> {
        let vu = self.vertex_uses.insert(VertexUseData { vertex, parent });
        self.vertex_mut(vertex)?.uses.push(vu);
        Ok(vu)
    }

    /// Returns the position of the vertex used by `vu`.
    ///
    /// # Errors
    ///
    /// Returns an error if either element is missing.
    pub fn vertex_use_point(&self, vu: VertexUseId) -> Result<Point3, TopologyError> {
        Ok(self.vertex(self.vertex_use(vu)?.vertex)?.point)
    }

    // --- Edge operations ---

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the model.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, TopologyError> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))
    }

    pub(crate) fn edge_mut(&mut self, id: EdgeId) -> Result<&mut EdgeData, TopologyError> {
        self.edges
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))
    }

    /// Returns the edge joining `a` and `b`, creating it if none exists.
    pub(crate) fn find_or_add_edge(&mut self, a: VertexId, b: VertexId) -> EdgeId {
        let key = if a <= b { (a, b) } else { (b, a) };
        if let Some(&edge) = self.edge_index.get(&key) {
            return edge;
        }
        let edge = self.edges.insert(EdgeData::default());
        self.edge_index.insert(key, edge);
        edge
    }

    /// Returns the edge joining `a` and `b`, if any.
    #[must_use]
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.edge_index.get(&key).copied()
    }

    /// Returns a reference to the edge use data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the model.
    pub fn edge_use(&self, id: EdgeUseId) -> Result<&EdgeUseData, TopologyError> {
        self.edge_uses
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge use".into()))
    }

    pub(crate) fn edge_use_mut(&mut self, id: EdgeUseId) -> Result<&mut EdgeUseData, TopologyError> {
        self.edge_uses
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge use".into()))
    }

    /// Inserts an edge use starting at `vertex`, with its vertex use.
    ///
    /// Mate and radial point at the new use itself until linked.
    pub(crate) fn add_edge_use(
        &mut self,
        edge: EdgeId,
        vertex: VertexId,
        parent: EdgeUseParent,
    ) -> Result<EdgeUseId, TopologyError> {
        let eu = self.edge_uses.insert(EdgeUseData {
            edge,
            vertex_use: VertexUseId::default(),
            mate: EdgeUseId::default(),
            radial: EdgeUseId::default(),
            parent,
        });
        let vu = self.add_vertex_use(vertex, VertexUseParent::Edge(eu))?;
        let data = self.edge_use_mut(eu)?;
        data.vertex_use = vu;
        data.mate = eu;
        data.radial = eu;
        self.edge_mut(edge)?.uses.push(eu);
        Ok(eu)
    }

    // --- Loop operations ---

    /// Returns a reference to the loop data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the model.
    pub fn loop_data(&self, id: LoopId) -> Result<&LoopData, TopologyError> {
        self.loops
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("loop".into()))
    }

    pub(crate) fn add_loop(&mut self, data: LoopData) -> LoopId {
        self.loops.insert(data)
    }

    /// Returns a reference to the loop use data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the model.
    pub fn loop_use(&self, id: LoopUseId) -> Result<&LoopUseData, TopologyError> {
        self.loop_uses
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("loop use".into()))
    }

    pub(crate) fn loop_use_mut(&mut self, id: LoopUseId) -> Result<&mut LoopUseData, TopologyError> {
        self.loop_uses
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("loop use".into()))
    }

    pub(crate) fn add_loop_use(&mut self, data: LoopUseData) -> LoopUseId {
        self.loop_uses.insert(data)
    }

    // --- Face operations ---

    /// Inserts a plane record that several faces may share.
    pub fn add_face_geometry(&mut self, plane: PlaneEquation) -> FaceGeometryId {
        self.geometries.insert(FaceGeometry { plane })
    }

    /// Returns a reference to the plane record, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the model.
    pub fn face_geometry(&self, id: FaceGeometryId) -> Result<&FaceGeometry, TopologyError> {
        self.geometries
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face geometry".into()))
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the model.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, TopologyError> {
        self.faces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    pub(crate) fn add_face(&mut self, data: FaceData) -> FaceId {
        self.faces.insert(data)
    }

    /// Returns a reference to the face use data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the model.
    pub fn face_use(&self, id: FaceUseId) -> Result<&FaceUseData, TopologyError> {
        self.face_uses
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face use".into()))
    }

    pub(crate) fn face_use_mut(&mut self, id: FaceUseId) -> Result<&mut FaceUseData, TopologyError> {
        self.face_uses
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face use".into()))
    }

    pub(crate) fn add_face_use(&mut self, data: FaceUseData) -> FaceUseId {
        self.face_uses.insert(data)
    }

    // --- Shell operations ---

    /// Inserts an empty shell and returns its ID.
    pub fn add_shell(&mut self) -> ShellId {
        self.shells.insert(ShellData::new())
    }

    /// Returns a reference to the shell data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the model.
    pub fn shell(&self, id: ShellId) -> Result<&ShellData, TopologyError> {
        self.shells
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("shell".into()))
    }

    pub(crate) fn shell_mut(&mut self, id: ShellId) -> Result<&mut ShellData, TopologyError> {
        self.shells
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("shell".into()))
    }

    /// Grows the shell bounding box to include the given vertices.
    pub(crate) fn extend_shell_bbox(
        &mut self,
        shell: ShellId,
        vertices: &[VertexId],
    ) -> Result<(), TopologyError> {
        let mut points = Vec::with_capacity(vertices.len());
        for &v in vertices {
            points.push(self.vertex(v)?.point);
        }
        let bbox = &mut self.shell_mut(shell)?.bbox;
        for p in &points {
            bbox.extend(p);
        }
        Ok(())
    }
}
