//! Lifting point classification to the topology of a whole shell.
//!
//! Vertices are classified first, then edges from their end vertices, then
//! loops from their edges. Shared topology settles an element as `OnShared`
//! without any geometry; everything else falls back to the point-in-shell
//! ray cast. Geometric coincidence that topology does not already record
//! means an upstream intersection step was skipped, and is reported as an
//! [`InvariantViolation`].

use slotmap::SecondaryMap;
use tracing::{debug, error, info, instrument};

use crate::error::{InvariantViolation, PreconditionError, Result};
use crate::math::{Point3, Tolerance};
use crate::topology::{
    EdgeId, EdgeUseId, FaceId, FaceUseId, LoopChildren, LoopUseId, Model, Orientation, ShellId,
    VertexId, VertexUseId,
};

use super::cache::ClassificationCache;
use super::loop_identity::{loops_identical, LoopIdentity};
use super::point_in_shell::{classify_point_in_shell_with, RayCastOptions};
use super::Classification;

/// Options for a shell-pair classification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Ray cast settings for every geometric query.
    pub ray: RayCastOptions,
    /// Reclassify a contradictory loop once, logging each edge, before
    /// reporting it.
    pub diagnostic_retry: bool,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            ray: RayCastOptions::default(),
            diagnostic_retry: true,
        }
    }
}

/// Classifies every face, loop, edge and vertex of shell `a` against shell
/// `b`, returning the filled cache.
///
/// # Errors
///
/// Returns an [`InvariantViolation`] if the two shells touch without
/// sharing topology, and other errors if the model is corrupt.
pub fn classify_shells(
    model: &Model,
    a: ShellId,
    b: ShellId,
    tol: &Tolerance,
) -> Result<ClassificationCache> {
    let mut cache = ClassificationCache::new();
    classify_shells_with(model, a, b, tol, &ClassifyOptions::default(), &mut cache)?;
    Ok(cache)
}

/// [`classify_shells`] with explicit options, filling a caller-owned cache.
///
/// Elements already in the cache are not reclassified.
///
/// # Errors
///
/// See [`classify_shells`].
#[instrument(skip(model, tol, options, cache))]
pub fn classify_shells_with(
    model: &Model,
    a: ShellId,
    b: ShellId,
    tol: &Tolerance,
    options: &ClassifyOptions,
    cache: &mut ClassificationCache,
) -> Result<()> {
    info!("classifying shell");
    ShellClassifier::new(model, b, tol)?
        .with_options(*options)
        .shell(a, cache)?;
    debug!(
        queries = cache.geometric_queries(),
        "shell classification complete"
    );
    Ok(())
}

/// Classifies elements of one shell against a fixed other shell.
pub struct ShellClassifier<'a> {
    model: &'a Model,
    other: ShellId,
    tol: &'a Tolerance,
    options: ClassifyOptions,
    other_vertices: Vec<(VertexId, Point3)>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    inside: usize,
    on: usize,
    outside: usize,
}

impl<'a> ShellClassifier<'a> {
    /// Creates a classifier against `other`, collecting its vertices once.
    ///
    /// # Errors
    ///
    /// Returns a topology error if `other` or any of its elements is missing.
    pub fn new(model: &'a Model, other: ShellId, tol: &'a Tolerance) -> Result<Self> {
        let mut other_vertices = Vec::new();
        for v in model.shell_vertices(other)? {
            other_vertices.push((v, model.vertex(v)?.point));
        }
        Ok(Self {
            model,
            other,
            tol,
            options: ClassifyOptions::default(),
            other_vertices,
        })
    }

    /// Replaces the run options.
    #[must_use]
    pub fn with_options(mut self, options: ClassifyOptions) -> Self {
        self.options = options;
        self
    }

    /// Classifies every face, wire loop, wire edge and the lone vertex of
    /// `shell`.
    ///
    /// # Errors
    ///
    /// See [`classify_shells`].
    pub fn shell(&self, shell: ShellId, cache: &mut ClassificationCache) -> Result<()> {
        let data = self.model.shell(shell)?;
        let mut faces: SecondaryMap<FaceId, ()> = SecondaryMap::new();
        for &fu in &data.face_uses {
            if faces.insert(self.model.face_use(fu)?.face, ()).is_some() {
                continue;
            }
            self.face_use(fu, cache)?;
        }
        for &lu in &data.wire_loops {
            self.loop_use(lu, cache)?;
        }
        for &eu in &data.wire_edges {
            self.edge_use(eu, cache)?;
        }
        if let Some(vu) = data.lone_vertex {
            self.vertex_use(vu, cache)?;
        }
        Ok(())
    }

    /// Classifies each loop of a face use. Faces have no cache entry of
    /// their own.
    ///
    /// # Errors
    ///
    /// See [`classify_shells`].
    pub fn face_use(&self, fu: FaceUseId, cache: &mut ClassificationCache) -> Result<()> {
        for &lu in &self.model.face_use(fu)?.loops {
            self.loop_use(lu, cache)?;
        }
        Ok(())
    }

    /// Classifies a vertex through one of its uses.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::VertexTopologyNotShared`] if a vertex
    /// of the other shell sits at the same place, and
    /// [`InvariantViolation::VertexOnShell`] if the vertex lies on the other
    /// shell's boundary.
    pub fn vertex_use(
        &self,
        vu: VertexUseId,
        cache: &mut ClassificationCache,
    ) -> Result<Classification> {
        let vertex = self.model.vertex_use(vu)?.vertex;
        if let Some(class) = cache.vertex(vertex) {
            return Ok(class);
        }

        let data = self.model.vertex(vertex)?;
        for &other_vu in &data.uses {
            if self.model.shell_of_vertex_use(other_vu)? == self.other {
                debug!(?vertex, "vertex on-shared: used by the other shell");
                return Ok(cache.record_vertex(vertex, Classification::OnShared));
            }
        }

        let point = data.point;
        if let Some(other) = self.vertex_near(&point) {
            error!(?vertex, ?other, "vertices coincide without sharing topology");
            return Err(InvariantViolation::VertexTopologyNotShared {
                vertex,
                other,
                shell: self.other,
                point,
            }
            .into());
        }

        let class = self.classify_point(&point, cache)?;
        if class.is_on() {
            error!(?vertex, "vertex lies on the other shell but shares no topology");
            return Err(InvariantViolation::VertexOnShell {
                vertex,
                shell: self.other,
                point,
            }
            .into());
        }
        debug!(?vertex, %class, "vertex classified by ray cast");
        Ok(cache.record_vertex(vertex, class))
    }

    /// Classifies an edge through one of its uses.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::EdgeNotCut`] if one end is inside and
    /// the other outside, and [`InvariantViolation::EdgeMidpointOn`] if an
    /// unshared edge with both ends on the boundary lies on it.
    pub fn edge_use(&self, eu: EdgeUseId, cache: &mut ClassificationCache) -> Result<Classification> {
        let data = self.model.edge_use(eu)?;
        let edge = data.edge;
        if let Some(class) = cache.edge(edge) {
            return Ok(class);
        }

        let start = self.vertex_use(data.vertex_use, cache)?;
        let end = self.vertex_use(self.model.edge_use(data.mate)?.vertex_use, cache)?;
        let (class, reason) = match (start, end) {
            (Classification::Inside, Classification::Outside)
            | (Classification::Outside, Classification::Inside) => {
                error!(?edge, %start, %end, "edge crosses the other shell without being cut");
                return Err(InvariantViolation::EdgeNotCut { edge, start, end }.into());
            }
            (s, e) if s.is_on() && e.is_on() => return self.edge_on_boundary(eu, edge, cache),
            (Classification::Outside, _) | (_, Classification::Outside) => {
                (Classification::Outside, "vertices were out and on")
            }
            _ => (Classification::Inside, "vertices were in and on"),
        };
        debug!(?edge, %class, reason, "edge classified");
        Ok(cache.record_edge(edge, class))
    }

    /// Both ends are on the other shell: the edge is on it if some use of
    /// the edge belongs to it, otherwise its midpoint decides.
    fn edge_on_boundary(
        &self,
        eu: EdgeUseId,
        edge: EdgeId,
        cache: &mut ClassificationCache,
    ) -> Result<Classification> {
        let limit = self.model.edge(edge)?.uses.len();
        let mut eup = eu;
        for _ in 0..limit {
            if self.model.shell_of_edge_use(eup)? == self.other {
                debug!(?edge, "edge on-shared: radial use in the other shell");
                return Ok(cache.record_edge(edge, Classification::OnShared));
            }
            eup = self.model.mate(self.model.radial(eup)?)?;
            if eup == eu {
                break;
            }
        }

        let (start, end) = self.model.edge_use_points(eu)?;
        let midpoint = Point3::from((start.coords + end.coords) * 0.5);
        let class = self.classify_point(&midpoint, cache)?;
        if class.is_on() {
            error!(?edge, "edge midpoint on the other shell, edge not shared");
            return Err(InvariantViolation::EdgeMidpointOn {
                edge,
                shell: self.other,
                midpoint,
            }
            .into());
        }
        debug!(?edge, %class, "edge classified by its midpoint");
        Ok(cache.record_edge(edge, class))
    }

    /// Classifies a loop through one of its uses.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::LoopTransitsBoundary`] if the loop has
    /// edges both inside and outside, and the edge and vertex errors of
    /// [`edge_use`](Self::edge_use) and [`vertex_use`](Self::vertex_use).
    pub fn loop_use(&self, lu: LoopUseId, cache: &mut ClassificationCache) -> Result<Classification> {
        let data = self.model.loop_use(lu)?;
        if let Some(class) = cache.loop_class(data.lp) {
            return Ok(class);
        }

        let class = match &data.children {
            LoopChildren::Vertex(vu) => {
                let class = self.vertex_use(*vu, cache)?;
                debug!(?lu, %class, "vertex loop takes its vertex's class");
                class
            }
            LoopChildren::Edges(edges) => self.edge_loop(lu, edges, cache)?,
        };
        Ok(cache.record_loop(data.lp, class))
    }

    fn edge_loop(
        &self,
        lu: LoopUseId,
        edges: &[EdgeUseId],
        cache: &mut ClassificationCache,
    ) -> Result<Classification> {
        if edges.is_empty() {
            return Err(PreconditionError::MalformedLoop(lu).into());
        }

        let tally = self.tally(edges, cache)?;
        if tally.inside > 0 && tally.outside > 0 {
            error!(
                ?lu,
                inside = tally.inside,
                on = tally.on,
                outside = tally.outside,
                "loop transits the boundary of the other shell"
            );
            let tally = if self.options.diagnostic_retry {
                self.redo_tally(lu, edges, cache)?
            } else {
                tally
            };
            return Err(InvariantViolation::LoopTransitsBoundary {
                loop_use: lu,
                inside: tally.inside,
                on: tally.on,
                outside: tally.outside,
            }
            .into());
        }

        let class = if tally.outside > 0 {
            debug!(?lu, "loop outside: edges were out and on");
            Classification::Outside
        } else if tally.inside > 0 {
            debug!(?lu, "loop inside: edges were in and on");
            Classification::Inside
        } else {
            self.loop_on_boundary(lu, edges)?
        };
        Ok(class)
    }

    fn tally(&self, edges: &[EdgeUseId], cache: &mut ClassificationCache) -> Result<Tally> {
        let mut tally = Tally::default();
        for &eu in edges {
            match self.edge_use(eu, cache)? {
                Classification::Inside => tally.inside += 1,
                Classification::Outside => tally.outside += 1,
                Classification::OnShared | Classification::OnAnti => tally.on += 1,
            }
        }
        Ok(tally)
    }

    /// Forgets and recomputes the edges and vertices of a contradictory
    /// loop, logging each edge's verdict.
    fn redo_tally(
        &self,
        lu: LoopUseId,
        edges: &[EdgeUseId],
        cache: &mut ClassificationCache,
    ) -> Result<Tally> {
        for &eu in edges {
            let data = self.model.edge_use(eu)?;
            cache.clear_edge(data.edge);
            cache.clear_vertex(self.model.vertex_use(data.vertex_use)?.vertex);
        }
        let tally = self.tally(edges, cache)?;
        for &eu in edges {
            let edge = self.model.edge_use(eu)?.edge;
            let (start, end) = self.model.edge_use_points(eu)?;
            error!(?lu, ?eu, ?start, ?end, class = ?cache.edge(edge), "edge of transiting loop");
        }
        Ok(tally)
    }

    /// All edges are on the other shell: look for an identical loop there,
    /// then for a face of it around the edges to take the side from.
    fn loop_on_boundary(&self, lu: LoopUseId, edges: &[EdgeUseId]) -> Result<Classification> {
        if self.model.face_use_of_loop(lu)?.is_none() {
            debug!(?lu, "loop on-shared: wire loop with every edge on");
            return Ok(Classification::OnShared);
        }

        let first = edges[0];
        let limit = self.model.edge(self.model.edge_use(first)?.edge)?.uses.len();
        let mut eu = self.model.mate(self.model.radial(first)?)?;
        for _ in 0..limit {
            if eu == first {
                break;
            }
            if let Some(q_lu) = self.model.loop_use_of(eu)? {
                if q_lu != lu
                    && self.model.face_use_of_loop(q_lu)?.is_some()
                    && self.model.shell_of_loop_use(q_lu)? == self.other
                {
                    match loops_identical(self.model, eu, first)? {
                        LoopIdentity::NotIdentical => {}
                        LoopIdentity::Shared => {
                            debug!(?lu, "loop on-shared: identical loop, normals agree");
                            return Ok(Classification::OnShared);
                        }
                        LoopIdentity::AntiShared => {
                            debug!(?lu, "loop on-anti: identical loop, normals opposite");
                            return Ok(Classification::OnAnti);
                        }
                        LoopIdentity::Wire => {
                            error!(?lu, ?q_lu, "identical loop unexpectedly a wire");
                            return Err(InvariantViolation::UnexpectedWireLoop(lu).into());
                        }
                    }
                }
            }
            eu = self.model.mate(self.model.radial(eu)?)?;
        }

        for &eu in edges {
            let stop = self.model.mate(eu)?;
            let limit = self.model.edge(self.model.edge_use(eu)?.edge)?.uses.len();
            let mut p = self.model.radial(eu)?;
            for _ in 0..limit {
                if let Some(fu) = self.model.face_use_of(p)? {
                    let data = self.model.face_use(fu)?;
                    if data.shell == self.other {
                        return match data.orientation {
                            Orientation::Opposite => {
                                debug!(?lu, ?fu, "loop inside: radial face use faces inward");
                                Ok(Classification::Inside)
                            }
                            Orientation::Same => {
                                debug!(?lu, ?fu, "loop outside: radial face use faces outward");
                                Ok(Classification::Outside)
                            }
                            Orientation::Unspecified => {
                                error!(?lu, ?fu, "radial face use without orientation");
                                Err(InvariantViolation::BadOrientation(lu, data.orientation)
                                    .into())
                            }
                        };
                    }
                }
                p = self.model.radial(self.model.mate(p)?)?;
                if p == stop {
                    break;
                }
            }
        }

        debug!(?lu, "loop outside: on a wire part of the other shell");
        Ok(Classification::Outside)
    }

    fn vertex_near(&self, point: &Point3) -> Option<VertexId> {
        self.other_vertices
            .iter()
            .find(|(_, q)| (q - point).norm_squared() < self.tol.dist_sq())
            .map(|&(v, _)| v)
    }

    fn classify_point(&self, point: &Point3, cache: &mut ClassificationCache) -> Result<Classification> {
        cache.note_geometric_query();
        classify_point_in_shell_with(self.model, point, self.other, self.tol, &self.options.ray)
    }
}
