use std::fmt;

use crate::math::Aabb;

use super::edge::EdgeUseId;
use super::face::FaceUseId;
use super::shell::ShellId;
use super::vertex::VertexUseId;

slotmap::new_key_type! {
    /// Unique identifier for a loop in the model.
    pub struct LoopId;
}

slotmap::new_key_type! {
    /// Unique identifier for a loop use in the model.
    pub struct LoopUseId;
}

/// Sense of a loop or face use relative to the outward-normal convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Agrees with the outward normal; outer boundaries.
    Same,
    /// Inverted; holes, and the inward side of a face.
    Opposite,
    /// Not yet oriented.
    Unspecified,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Same => "same",
            Self::Opposite => "opposite",
            Self::Unspecified => "unspecified",
        };
        f.write_str(name)
    }
}

/// Data shared by both uses of a loop.
#[derive(Debug, Clone)]
pub struct LoopData {
    /// Bounding box of the loop vertices.
    pub bbox: Aabb,
}

/// The element a loop use belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopUseParent {
    /// A boundary of a face.
    Face(FaceUseId),
    /// A wire loop hanging directly off a shell.
    Shell(ShellId),
}

/// Children of a loop use: a closed cycle of edge uses or one vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopChildren {
    /// Edge uses in traversal order; each ends where the next begins.
    Edges(Vec<EdgeUseId>),
    /// A loop made of a single vertex.
    Vertex(VertexUseId),
}

/// One side of a loop.
#[derive(Debug, Clone)]
pub struct LoopUseData {
    /// The underlying loop.
    pub lp: LoopId,
    /// The use of the same loop on the other side of its face.
    pub mate: LoopUseId,
    /// Outer boundary (`Same`) or hole (`Opposite`).
    pub orientation: Orientation,
    /// The element holding this use.
    pub parent: LoopUseParent,
    /// The edge cycle or single vertex of this use.
    pub children: LoopChildren,
}
