use crate::error::GeometryError;

/// Distance and angle tolerances governing every "is zero" and "is
/// coincident" decision of the classifier.
///
/// A `Tolerance` is created once by the caller and passed by reference
/// through every operation; nothing in the crate mutates it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    dist: f64,
    dist_sq: f64,
    perp: f64,
    para: f64,
}

impl Tolerance {
    /// Default absolute distance tolerance.
    pub const DEFAULT_DIST: f64 = 0.0005;

    /// Default tolerance for "perpendicular" dot products (`|cos| <= perp`).
    pub const DEFAULT_PERP: f64 = 1e-6;

    /// Ratio between the strict edge-proximity distance and the ambient one.
    pub const STRICT_RATIO: f64 = 0.1;

    /// Creates a tolerance with the given absolute distance.
    ///
    /// # Errors
    ///
    /// Returns an error if `dist` is not a positive finite number.
    pub fn new(dist: f64) -> Result<Self, GeometryError> {
        if !dist.is_finite() || dist <= 0.0 {
            return Err(GeometryError::InvalidTolerance(dist));
        }
        Ok(Self {
            dist,
            dist_sq: dist * dist,
            perp: Self::DEFAULT_PERP,
            para: 1.0 - Self::DEFAULT_PERP,
        })
    }

    /// Replaces the perpendicularity tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if `perp` is not within `(0, 1)`.
    pub fn with_perp(self, perp: f64) -> Result<Self, GeometryError> {
        if !(perp > 0.0 && perp < 1.0) {
            return Err(GeometryError::InvalidTolerance(perp));
        }
        Ok(Self {
            perp,
            para: 1.0 - perp,
            ..self
        })
    }

    /// Absolute distance tolerance.
    #[must_use]
    pub fn dist(&self) -> f64 {
        self.dist
    }

    /// Square of [`dist`](Self::dist).
    #[must_use]
    pub fn dist_sq(&self) -> f64 {
        self.dist_sq
    }

    /// Dot products of unit vectors with magnitude below this are perpendicular.
    #[must_use]
    pub fn perp(&self) -> f64 {
        self.perp
    }

    /// Dot products of unit vectors with magnitude above this are parallel.
    #[must_use]
    pub fn para(&self) -> f64 {
        self.para
    }

    /// Returns the tighter tolerance used when deciding that a point touches
    /// an edge or one of its endpoints.
    ///
    /// Keeps points that are merely close to a boundary vertex from snapping
    /// onto it.
    #[must_use]
    pub fn strict(&self) -> Self {
        let dist = self.dist * Self::STRICT_RATIO;
        Self {
            dist,
            dist_sq: dist * dist,
            ..*self
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            dist: Self::DEFAULT_DIST,
            dist_sq: Self::DEFAULT_DIST * Self::DEFAULT_DIST,
            perp: Self::DEFAULT_PERP,
            para: 1.0 - Self::DEFAULT_PERP,
        }
    }
}
