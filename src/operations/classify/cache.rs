use slotmap::SecondaryMap;

use crate::topology::{EdgeId, LoopId, VertexId};

use super::Classification;

/// Per-run record of how each vertex, edge and loop of one shell lies
/// relative to another shell.
///
/// Tables are dense and keyed by element identity, so each element holds at
/// most one classification. Entries are first-write-wins: once an element
/// is classified it is never recomputed in the same run, except through
/// the `clear_*` methods used by the loop contradiction redo.
#[derive(Debug, Default)]
pub struct ClassificationCache {
    vertices: SecondaryMap<VertexId, Classification>,
    edges: SecondaryMap<EdgeId, Classification>,
    loops: SecondaryMap<LoopId, Classification>,
    geometric_queries: usize,
}

impl ClassificationCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached classification of a vertex.
    #[must_use]
    pub fn vertex(&self, v: VertexId) -> Option<Classification> {
        self.vertices.get(v).copied()
    }

    /// Cached classification of an edge.
    #[must_use]
    pub fn edge(&self, e: EdgeId) -> Option<Classification> {
        self.edges.get(e).copied()
    }

    /// Cached classification of a loop.
    #[must_use]
    pub fn loop_class(&self, l: LoopId) -> Option<Classification> {
        self.loops.get(l).copied()
    }

    /// Records a vertex classification and returns the value now cached,
    /// which is the earlier one if the vertex was already classified.
    pub fn record_vertex(&mut self, v: VertexId, class: Classification) -> Classification {
        record(&mut self.vertices, v, class)
    }

    /// Records an edge classification; see [`record_vertex`](Self::record_vertex).
    pub fn record_edge(&mut self, e: EdgeId, class: Classification) -> Classification {
        record(&mut self.edges, e, class)
    }

    /// Records a loop classification; see [`record_vertex`](Self::record_vertex).
    pub fn record_loop(&mut self, l: LoopId, class: Classification) -> Classification {
        record(&mut self.loops, l, class)
    }

    pub(crate) fn clear_vertex(&mut self, v: VertexId) {
        self.vertices.remove(v);
    }

    pub(crate) fn clear_edge(&mut self, e: EdgeId) {
        self.edges.remove(e);
    }

    /// Vertices in the given bucket.
    pub fn vertices_in(&self, class: Classification) -> impl Iterator<Item = VertexId> + '_ {
        bucket(&self.vertices, class)
    }

    /// Edges in the given bucket.
    pub fn edges_in(&self, class: Classification) -> impl Iterator<Item = EdgeId> + '_ {
        bucket(&self.edges, class)
    }

    /// Loops in the given bucket.
    pub fn loops_in(&self, class: Classification) -> impl Iterator<Item = LoopId> + '_ {
        bucket(&self.loops, class)
    }

    /// Number of point-in-shell queries made on behalf of this cache.
    #[must_use]
    pub fn geometric_queries(&self) -> usize {
        self.geometric_queries
    }

    pub(crate) fn note_geometric_query(&mut self) {
        self.geometric_queries += 1;
    }
}

fn record<K: slotmap::Key>(
    table: &mut SecondaryMap<K, Classification>,
    key: K,
    class: Classification,
) -> Classification {
    if let Some(&existing) = table.get(key) {
        return existing;
    }
    table.insert(key, class);
    class
}

fn bucket<K: slotmap::Key>(
    table: &SecondaryMap<K, Classification>,
    class: Classification,
) -> impl Iterator<Item = K> + '_ {
    table
        .iter()
        .filter(move |&(_, &c)| c == class)
        .map(|(k, _)| k)
}
