use crate::error::GeometryError;

use super::{Point3, Tolerance, Vector3, ZERO_LENGTH};

/// An infinite plane stored as a unit normal `N` and offset `d`, so that
/// points on the plane satisfy `N · p = d`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneEquation {
    normal: Vector3,
    d: f64,
}

impl PlaneEquation {
    /// Creates a plane through `origin` with the given normal.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: &Point3, normal: &Vector3) -> Result<Self, GeometryError> {
        let normal = normal
            .try_normalize(ZERO_LENGTH)
            .ok_or(GeometryError::ZeroVector)?;
        Ok(Self {
            normal,
            d: normal.dot(&origin.coords),
        })
    }

    /// Fits a plane to a closed polygon using Newell's method.
    ///
    /// The normal follows the right-hand rule over the vertex order.
    ///
    /// # Errors
    ///
    /// Returns an error if the polygon has fewer than three vertices or
    /// encloses no area.
    pub fn from_polygon(points: &[Point3]) -> Result<Self, GeometryError> {
        if points.len() < 3 {
            return Err(GeometryError::Degenerate(format!(
                "polygon with {} vertices has no plane",
                points.len()
            )));
        }
        #[allow(clippy::cast_precision_loss)]
        let count = points.len() as f64;
        let centroid = points
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords)
            / count;
        Self::from_normal(&Point3::from(centroid), &newell_normal(points)).map_err(|_| {
            GeometryError::Degenerate("polygon encloses no area".into())
        })
    }

    /// Returns the unit normal.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the same plane with the normal reversed.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            normal: -self.normal,
            d: -self.d,
        }
    }

    /// Signed distance from `p` to the plane, positive on the normal side.
    #[must_use]
    pub fn distance(&self, p: &Point3) -> f64 {
        self.normal.dot(&p.coords) - self.d
    }

    /// Intersects the line `origin + t * dir` with the plane.
    ///
    /// `dir` need not be unit length; `t` is measured in multiples of it.
    #[must_use]
    pub fn intersect_line(
        &self,
        origin: &Point3,
        dir: &Vector3,
        tol: &Tolerance,
    ) -> LinePlaneRelation {
        let dir_len = dir.norm();
        let signed = self.distance(origin);
        if dir_len < ZERO_LENGTH {
            return LinePlaneRelation::Parallel;
        }
        let denom = self.normal.dot(dir);

        if (denom / dir_len).abs() < tol.perp() {
            if signed.abs() <= tol.dist() {
                LinePlaneRelation::OnPlane
            } else {
                LinePlaneRelation::Parallel
            }
        } else {
            let t = -signed / denom;
            LinePlaneRelation::Point {
                point: origin + dir * t,
                t,
            }
        }
    }
}

/// Relationship of a line with a plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinePlaneRelation {
    /// Line crosses the plane at a single point.
    Point { point: Point3, t: f64 },
    /// Line is parallel to the plane and off it.
    Parallel,
    /// Line lies within the plane.
    OnPlane,
}

/// Unnormalized Newell normal of a closed polygon.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Vector3 {
    let mut normal = Vector3::zeros();
    for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}
