use crate::math::Point3;

use super::edge::EdgeUseId;
use super::loops::LoopUseId;
use super::shell::ShellId;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the model.
    pub struct VertexId;
}

slotmap::new_key_type! {
    /// Unique identifier for a vertex use in the model.
    pub struct VertexUseId;
}

/// Data associated with a topological vertex.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// The 3D position of the vertex.
    pub point: Point3,
    /// Every use of this vertex, across all shells.
    pub uses: Vec<VertexUseId>,
}

impl VertexData {
    /// Creates a new, unused vertex at the given point.
    #[must_use]
    pub fn new(point: Point3) -> Self {
        Self {
            point,
            uses: Vec::new(),
        }
    }
}

/// The element a vertex use belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexUseParent {
    /// The sole child of a single-vertex loop.
    Loop(LoopUseId),
    /// The starting vertex of an edge use.
    Edge(EdgeUseId),
    /// The lone vertex of a shell with no other topology.
    Shell(ShellId),
}

/// One reference to a vertex from the topology above it.
#[derive(Debug, Clone)]
pub struct VertexUseData {
    /// The vertex being used.
    pub vertex: VertexId,
    /// The element holding this use.
    pub parent: VertexUseParent,
}
