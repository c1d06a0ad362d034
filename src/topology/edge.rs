use super::loops::LoopUseId;
use super::shell::ShellId;
use super::vertex::VertexUseId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in the model.
    pub struct EdgeId;
}

slotmap::new_key_type! {
    /// Unique identifier for an edge use in the model.
    pub struct EdgeUseId;
}

/// Data associated with a topological edge.
///
/// The edge itself carries no geometry; its end points come from the
/// vertex uses of its edge uses.
#[derive(Debug, Clone, Default)]
pub struct EdgeData {
    /// All uses of the edge, stored as consecutive mate pairs.
    pub uses: Vec<EdgeUseId>,
}

/// The element an edge use belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeUseParent {
    /// Part of a loop, which is either face-bounded or a wire loop.
    Loop(LoopUseId),
    /// A wire edge hanging directly off a shell.
    Shell(ShellId),
}

/// A directed use of an edge.
///
/// `mate` is the use running the opposite way on the other side of the
/// same face (or wire). `radial` is the use facing the same region across
/// the next face around the edge; following `radial` then `mate` visits
/// every face sharing the edge.
#[derive(Debug, Clone)]
pub struct EdgeUseData {
    /// The underlying edge.
    pub edge: EdgeId,
    /// Use of the vertex this edge use starts at.
    pub vertex_use: VertexUseId,
    /// Opposite-direction use of the same edge.
    pub mate: EdgeUseId,
    /// Next use around the edge.
    pub radial: EdgeUseId,
    /// The element holding this use.
    pub parent: EdgeUseParent,
}
