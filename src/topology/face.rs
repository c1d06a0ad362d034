use crate::math::PlaneEquation;

use super::loops::{LoopUseId, Orientation};
use super::shell::ShellId;

slotmap::new_key_type! {
    /// Unique identifier for a shared plane record.
    pub struct FaceGeometryId;
}

slotmap::new_key_type! {
    /// Unique identifier for a face in the model.
    pub struct FaceId;
}

slotmap::new_key_type! {
    /// Unique identifier for a face use in the model.
    pub struct FaceUseId;
}

/// Plane geometry, possibly shared by several coincident faces.
#[derive(Debug, Clone)]
pub struct FaceGeometry {
    /// The plane equation.
    pub plane: PlaneEquation,
}

/// Data associated with a topological face.
#[derive(Debug, Clone)]
pub struct FaceData {
    /// The plane this face lies on.
    pub geometry: FaceGeometryId,
    /// If `true`, the face normal is the reverse of the plane normal.
    pub flip: bool,
}

/// One side of a face.
#[derive(Debug, Clone)]
pub struct FaceUseData {
    /// The underlying face.
    pub face: FaceId,
    /// The use on the other side of the face.
    pub mate: FaceUseId,
    /// `Same` for the outward-facing side, `Opposite` for the inward one.
    pub orientation: Orientation,
    /// The shell this face use belongs to.
    pub shell: ShellId,
    /// Loops bounding this side of the face.
    pub loops: Vec<LoopUseId>,
}
