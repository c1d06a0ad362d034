use thiserror::Error;

use crate::math::Point3;
use crate::operations::classify::Classification;
use crate::topology::{
    EdgeId, EdgeUseId, FaceUseId, LoopUseId, Orientation, ShellId, VertexId,
};

/// Top-level error type for shell classification.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

impl ClassifyError {
    /// Returns `true` if the error is a fatal invariant violation rather than
    /// a recoverable input problem.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Invariant(_) | Self::Topology(_))
    }
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("invalid tolerance: {0}")]
    InvalidTolerance(f64),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to the radial-edge model itself.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Recoverable input errors.
///
/// The caller typically treats these as "classification unavailable".
#[derive(Debug, Error)]
pub enum PreconditionError {
    #[error("point ({}, {}, {}) is {distance} off the plane of face use {face_use:?}", .point.x, .point.y, .point.z)]
    PointOffPlane {
        point: Point3,
        face_use: FaceUseId,
        distance: f64,
    },

    #[error("loop use {0:?} is not bounded by a face")]
    NotFaceLoop(LoopUseId),

    #[error("loop uses {0:?} and {1:?} lie in different faces")]
    LoopsInDifferentFaces(LoopUseId, LoopUseId),

    #[error("loop use {0:?} has no edge uses and no vertex use")]
    MalformedLoop(LoopUseId),
}

/// Fatal conditions showing that the topology handed to the classifier is
/// structurally inconsistent.
///
/// Each variant is a reason code and carries the element identities and
/// geometric values involved.
#[derive(Debug, Error)]
pub enum InvariantViolation {
    #[error(
        "vertex {vertex:?} at ({}, {}, {}) coincides with vertex {other:?} of shell {shell:?} without sharing topology",
        .point.x, .point.y, .point.z
    )]
    VertexTopologyNotShared {
        vertex: VertexId,
        other: VertexId,
        shell: ShellId,
        point: Point3,
    },

    #[error(
        "vertex {vertex:?} at ({}, {}, {}) was found on shell {shell:?} geometrically",
        .point.x, .point.y, .point.z
    )]
    VertexOnShell {
        vertex: VertexId,
        shell: ShellId,
        point: Point3,
    },

    #[error("edge {edge:?} was not cut: start vertex is {start}, end vertex is {end}")]
    EdgeNotCut {
        edge: EdgeId,
        start: Classification,
        end: Classification,
    },

    #[error(
        "midpoint ({}, {}, {}) of edge {edge:?} lies on shell {shell:?} but the edge is not shared",
        .midpoint.x, .midpoint.y, .midpoint.z
    )]
    EdgeMidpointOn {
        edge: EdgeId,
        shell: ShellId,
        midpoint: Point3,
    },

    #[error("loop use {loop_use:?} transits the boundary: in={inside} on={on} out={outside}")]
    LoopTransitsBoundary {
        loop_use: LoopUseId,
        inside: usize,
        on: usize,
        outside: usize,
    },

    #[error("loop use {0:?} matched an identical wire loop")]
    UnexpectedWireLoop(LoopUseId),

    #[error(
        "edge use {edge_use:?} ({this:?}) and its face-radial {radial:?} ({other:?}) disagree in orientation"
    )]
    RadialOrientation {
        edge_use: EdgeUseId,
        radial: EdgeUseId,
        this: Orientation,
        other: Orientation,
    },

    #[error("loop use {0:?} has unusable orientation {1:?}")]
    BadOrientation(LoopUseId, Orientation),

    #[error(
        "ray from ({}, {}, {}) grazed an edge in all {attempts} probe directions",
        .point.x, .point.y, .point.z
    )]
    RayUnresolved { point: Point3, attempts: usize },

    #[error("radial edge uses {0:?} and {1:?} do not share vertices")]
    RadialVertexMismatch(EdgeUseId, EdgeUseId),

    #[error("edge uses {0:?} and {1:?} reference different edges")]
    DifferingEdges(EdgeUseId, EdgeUseId),
}

/// Convenience type alias for results using [`ClassifyError`].
pub type Result<T> = std::result::Result<T, ClassifyError>;
