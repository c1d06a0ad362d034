pub mod bbox;
pub mod plane;
pub mod segment;
pub mod tolerance;

pub use bbox::Aabb;
pub use plane::{newell_normal, LinePlaneRelation, PlaneEquation};
pub use segment::{point_segment_proximity, ProximityKind, SegmentProximity};
pub use tolerance::Tolerance;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Threshold below which a vector length is treated as zero when normalizing.
pub const ZERO_LENGTH: f64 = 1e-12;
