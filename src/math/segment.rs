use super::{Point3, Tolerance, ZERO_LENGTH};

/// Where the closest approach of a point to a line segment falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityKind {
    /// The point is within tolerance of the segment interior.
    Interior,
    /// The point is within tolerance of the start vertex.
    Start,
    /// The point is within tolerance of the end vertex.
    End,
    /// The point projects before the start vertex.
    BeforeStart,
    /// The point projects past the end vertex.
    PastEnd,
    /// The point projects onto the segment but lies off it.
    Beside,
}

/// Result of [`point_segment_proximity`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProximity {
    /// Classification of the closest approach.
    pub kind: ProximityKind,
    /// Point of closest approach on the segment.
    pub pca: Point3,
    /// Distance from the query point to `pca`; zero when the point touches
    /// the segment.
    pub dist: f64,
}

impl SegmentProximity {
    /// Returns `true` if the point touches the segment or one of its ends.
    #[must_use]
    pub fn is_on(&self) -> bool {
        matches!(
            self.kind,
            ProximityKind::Interior | ProximityKind::Start | ProximityKind::End
        )
    }
}

/// Finds the closest approach from `p` to the segment `a`-`b`.
///
/// Endpoint hits are tested before the interior so that a point near a
/// vertex always reports the vertex.
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn point_segment_proximity(
    p: &Point3,
    a: &Point3,
    b: &Point3,
    tol: &Tolerance,
) -> SegmentProximity {
    let p_to_a = p - a;
    if p_to_a.norm_squared() < tol.dist_sq() {
        return SegmentProximity {
            kind: ProximityKind::Start,
            pca: *a,
            dist: 0.0,
        };
    }
    let p_to_b = p - b;
    if p_to_b.norm_squared() < tol.dist_sq() {
        return SegmentProximity {
            kind: ProximityKind::End,
            pca: *b,
            dist: 0.0,
        };
    }

    let a_to_b = b - a;
    let len = a_to_b.norm();
    if len < ZERO_LENGTH {
        return SegmentProximity {
            kind: ProximityKind::BeforeStart,
            pca: *a,
            dist: p_to_a.norm(),
        };
    }
    let dir = a_to_b / len;
    let t = p_to_a.dot(&dir);

    if t <= 0.0 {
        return SegmentProximity {
            kind: ProximityKind::BeforeStart,
            pca: *a,
            dist: p_to_a.norm(),
        };
    }
    if t >= len {
        return SegmentProximity {
            kind: ProximityKind::PastEnd,
            pca: *b,
            dist: p_to_b.norm(),
        };
    }

    let pca = a + dir * t;
    let dist_sq = (p - pca).norm_squared();
    if dist_sq < tol.dist_sq() {
        SegmentProximity {
            kind: ProximityKind::Interior,
            pca,
            dist: 0.0,
        }
    } else {
        SegmentProximity {
            kind: ProximityKind::Beside,
            pca,
            dist: dist_sq.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn proximity(q: Point3) -> SegmentProximity {
        point_segment_proximity(&q, &p(0.0, 0.0, 0.0), &p(2.0, 0.0, 0.0), &Tolerance::default())
    }

    #[test]
    fn endpoints_win_over_interior() {
        assert_eq!(proximity(p(0.0, 0.0, 0.0)).kind, ProximityKind::Start);
        assert_eq!(proximity(p(2.0, 0.0, 0.0)).kind, ProximityKind::End);
        assert!(proximity(p(2.0, 0.0, 0.0)).is_on());
    }

    #[test]
    fn interior_hit() {
        let prox = proximity(p(1.0, 1e-6, 0.0));
        assert_eq!(prox.kind, ProximityKind::Interior);
        assert_relative_eq!(prox.dist, 0.0);
    }

    #[test]
    fn beside_reports_perpendicular_distance() {
        let prox = proximity(p(1.5, 0.0, 3.0));
        assert_eq!(prox.kind, ProximityKind::Beside);
        assert_relative_eq!(prox.dist, 3.0);
        assert_relative_eq!(prox.pca.x, 1.5);
    }

    #[test]
    fn beyond_the_ends() {
        let before = proximity(p(-3.0, 4.0, 0.0));
        assert_eq!(before.kind, ProximityKind::BeforeStart);
        assert_relative_eq!(before.dist, 5.0);

        let past = proximity(p(5.0, 0.0, 4.0));
        assert_eq!(past.kind, ProximityKind::PastEnd);
        assert_relative_eq!(past.dist, 5.0);
        assert!(!past.is_on());
    }
}
