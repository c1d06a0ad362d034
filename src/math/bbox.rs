use super::{Point3, Tolerance};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Returns a box containing nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Returns the smallest box containing every point.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.extend(p);
        }
        bbox
    }

    /// Returns `true` if no point has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Grows the box to contain `p`.
    pub fn extend(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Returns `true` if `p` lies inside the box padded by the distance tolerance.
    #[must_use]
    pub fn contains(&self, p: &Point3, tol: &Tolerance) -> bool {
        let pad = tol.dist();
        p.x >= self.min.x - pad
            && p.x <= self.max.x + pad
            && p.y >= self.min.y - pad
            && p.y <= self.max.y + pad
            && p.z >= self.min.z - pad
            && p.z <= self.max.z + pad
    }

    /// Length of the box diagonal, zero for an empty box.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            (self.max - self.min).norm()
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn empty_box_contains_nothing() {
        let bbox = Aabb::empty();
        assert!(bbox.is_empty());
        assert!(!bbox.contains(&p(0.0, 0.0, 0.0), &Tolerance::default()));
        assert_relative_eq!(bbox.diagonal(), 0.0);
    }

    #[test]
    fn contains_is_padded_by_tolerance() {
        let bbox = Aabb::from_points(&[p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)]);
        let tol = Tolerance::default();
        assert!(bbox.contains(&p(1.0 + tol.dist() * 0.5, 0.5, 0.5), &tol));
        assert!(!bbox.contains(&p(1.0 + tol.dist() * 2.0, 0.5, 0.5), &tol));
    }

    #[test]
    fn extend_and_diagonal() {
        let mut a = Aabb::from_points(&[p(0.0, 0.0, 0.0)]);
        a.extend(&p(1.0, 2.0, 2.0));
        assert_relative_eq!(a.diagonal(), 3.0);
        assert_relative_eq!(Aabb::empty().diagonal(), 0.0);
    }
}
