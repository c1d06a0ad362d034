use crate::error::{Result, TopologyError};
use crate::topology::{
    EdgeUseId, EdgeUseParent, LoopUseId, LoopUseParent, Model, Orientation, ShellId, VertexId,
    VertexUseId, VertexUseParent,
};

use super::make_face::add_loop_pair;

/// Creates a closed wire loop hanging directly off a shell.
pub struct MakeWireLoop {
    shell: ShellId,
    vertices: Vec<VertexId>,
}

impl MakeWireLoop {
    /// Creates a new `MakeWireLoop` operation.
    #[must_use]
    pub fn new(shell: ShellId, vertices: Vec<VertexId>) -> Self {
        Self { shell, vertices }
    }

    /// Executes the operation, returning the first of the two loop uses.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop is degenerate or the shell is missing.
    pub fn execute(&self, model: &mut Model) -> Result<LoopUseId> {
        model.shell(self.shell)?;
        let (lu, lu_mate, edges) = add_loop_pair(
            model,
            (
                LoopUseParent::Shell(self.shell),
                LoopUseParent::Shell(self.shell),
            ),
            &self.vertices,
            Orientation::Unspecified,
        )?;
        let shell = model.shell_mut(self.shell)?;
        shell.wire_loops.push(lu);
        shell.wire_loops.push(lu_mate);
        model.extend_shell_bbox(self.shell, &self.vertices)?;
        for edge in edges {
            model.relink_radials(edge)?;
        }
        Ok(lu)
    }
}

/// Creates a wire edge between two vertices of a shell.
pub struct MakeWireEdge {
    shell: ShellId,
    start: VertexId,
    end: VertexId,
}

impl MakeWireEdge {
    /// Creates a new `MakeWireEdge` operation.
    #[must_use]
    pub fn new(shell: ShellId, start: VertexId, end: VertexId) -> Self {
        Self { shell, start, end }
    }

    /// Executes the operation, returning the use running from `start` to
    /// `end`.
    ///
    /// # Errors
    ///
    /// Returns an error if both ends are the same vertex or the shell is
    /// missing.
    pub fn execute(&self, model: &mut Model) -> Result<EdgeUseId> {
        model.shell(self.shell)?;
        if self.start == self.end {
            return Err(TopologyError::InvalidTopology("wire edge is a loop".into()).into());
        }
        let edge = model.find_or_add_edge(self.start, self.end);
        let parent = EdgeUseParent::Shell(self.shell);
        let eu = model.add_edge_use(edge, self.start, parent)?;
        let eu_mate = model.add_edge_use(edge, self.end, parent)?;
        model.edge_use_mut(eu)?.mate = eu_mate;
        model.edge_use_mut(eu_mate)?.mate = eu;

        let shell = model.shell_mut(self.shell)?;
        shell.wire_edges.push(eu);
        shell.wire_edges.push(eu_mate);
        model.extend_shell_bbox(self.shell, &[self.start, self.end])?;
        model.relink_radials(edge)?;
        Ok(eu)
    }
}

/// Makes a vertex the sole content of an otherwise empty shell.
pub struct MakeLoneVertex {
    shell: ShellId,
    vertex: VertexId,
}

impl MakeLoneVertex {
    /// Creates a new `MakeLoneVertex` operation.
    #[must_use]
    pub fn new(shell: ShellId, vertex: VertexId) -> Self {
        Self { shell, vertex }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell already holds any topology.
    pub fn execute(&self, model: &mut Model) -> Result<VertexUseId> {
        let data = model.shell(self.shell)?;
        if data.lone_vertex.is_some()
            || !data.face_uses.is_empty()
            || !data.wire_loops.is_empty()
            || !data.wire_edges.is_empty()
        {
            return Err(TopologyError::InvalidTopology(
                "lone vertex requires an empty shell".into(),
            )
            .into());
        }
        let vu = model.add_vertex_use(self.vertex, VertexUseParent::Shell(self.shell))?;
        model.shell_mut(self.shell)?.lone_vertex = Some(vu);
        model.extend_shell_bbox(self.shell, &[self.vertex])?;
        Ok(vu)
    }
}
