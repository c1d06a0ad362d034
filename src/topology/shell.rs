use crate::math::Aabb;

use super::edge::EdgeUseId;
use super::face::FaceUseId;
use super::loops::LoopUseId;
use super::vertex::VertexUseId;

slotmap::new_key_type! {
    /// Unique identifier for a shell in the model.
    pub struct ShellId;
}

/// Data associated with a topological shell.
///
/// A shell is a connected set of faces, wire loops and wire edges. It may
/// be a closed volume or a wireframe; a shell with nothing else may hold a
/// single lone vertex.
#[derive(Debug, Clone, Default)]
pub struct ShellData {
    /// Face uses of the shell, each followed by its mate.
    pub face_uses: Vec<FaceUseId>,
    /// Wire loop uses not bounding any face.
    pub wire_loops: Vec<LoopUseId>,
    /// Wire edge uses not in any loop.
    pub wire_edges: Vec<EdgeUseId>,
    /// The shell's lone vertex, if it has no other topology.
    pub lone_vertex: Option<VertexUseId>,
    /// Bounding box of everything in the shell.
    pub bbox: Aabb,
}

impl ShellData {
    /// Creates an empty shell.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
