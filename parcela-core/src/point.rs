//! Projected input coordinates.

use geo::Coord;
use thiserror::Error;

/// A coordinate pair expressed in a projected reference system.
///
/// Points are supplied by the caller already transformed into the system
/// named by `reference_system` (for example `EPSG:25830`). The engine never
/// reprojects them.
///
/// # Examples
/// ```
/// use parcela_core::ProjectedPoint;
///
/// # fn main() -> Result<(), parcela_core::PointError> {
/// let point = ProjectedPoint::new(440_000.0, 4_474_000.0, "EPSG:25830")?;
/// assert_eq!(point.reference_system(), "EPSG:25830");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedPoint {
    location: Coord<f64>,
    reference_system: String,
}

/// Errors returned by [`ProjectedPoint::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointError {
    /// A coordinate was NaN or infinite.
    #[error("coordinate {axis} must be a finite number")]
    NonFiniteCoordinate {
        /// Name of the offending axis (`x` or `y`).
        axis: &'static str,
    },
    /// The reference-system identifier was empty or whitespace.
    #[error("reference system identifier must not be empty")]
    EmptyReferenceSystem,
}

impl ProjectedPoint {
    /// Validates and constructs a [`ProjectedPoint`].
    ///
    /// The reference-system identifier is trimmed before it is stored.
    ///
    /// # Errors
    /// Returns [`PointError`] when either coordinate is not finite or the
    /// reference system is blank.
    pub fn new(x: f64, y: f64, reference_system: impl Into<String>) -> Result<Self, PointError> {
        if !x.is_finite() {
            return Err(PointError::NonFiniteCoordinate { axis: "x" });
        }
        if !y.is_finite() {
            return Err(PointError::NonFiniteCoordinate { axis: "y" });
        }
        let raw: String = reference_system.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PointError::EmptyReferenceSystem);
        }
        Ok(Self {
            location: Coord { x, y },
            reference_system: trimmed.to_owned(),
        })
    }

    /// Easting in the point's reference system.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.location.x
    }

    /// Northing in the point's reference system.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.location.y
    }

    /// Position as a `geo` coordinate.
    #[must_use]
    pub const fn location(&self) -> Coord<f64> {
        self.location
    }

    /// Reference-system identifier, e.g. `EPSG:25830`.
    #[must_use]
    pub fn reference_system(&self) -> &str {
        &self.reference_system
    }

    /// Return the point `radius_meters` away in direction `angle_radians`.
    ///
    /// Angles are measured counter-clockwise from the positive x axis. The
    /// result stays in the same reference system; a projected system in
    /// metres is assumed.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "probe offsets are polar-to-cartesian conversions"
    )]
    pub fn offset(&self, radius_meters: f64, angle_radians: f64) -> Self {
        let (sin, cos) = angle_radians.sin_cos();
        let delta = Coord {
            x: radius_meters * cos,
            y: radius_meters * sin,
        };
        Self {
            location: self.location + delta,
            reference_system: self.reference_system.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::f64::consts::FRAC_PI_2;

    #[rstest]
    #[case(f64::NAN, 0.0, "x")]
    #[case(f64::INFINITY, 0.0, "x")]
    #[case(0.0, f64::NEG_INFINITY, "y")]
    fn rejects_non_finite_coordinates(
        #[case] x: f64,
        #[case] y: f64,
        #[case] axis: &'static str,
    ) {
        let err = ProjectedPoint::new(x, y, "EPSG:25830").expect_err("expected rejection");
        assert_eq!(err, PointError::NonFiniteCoordinate { axis });
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn rejects_blank_reference_system(#[case] srs: &str) {
        let err = ProjectedPoint::new(1.0, 2.0, srs).expect_err("expected rejection");
        assert_eq!(err, PointError::EmptyReferenceSystem);
    }

    #[rstest]
    fn trims_reference_system() {
        let point = ProjectedPoint::new(1.0, 2.0, " EPSG:4326 ").expect("valid point");
        assert_eq!(point.reference_system(), "EPSG:4326");
    }

    #[rstest]
    fn offset_moves_along_angle() {
        let origin = ProjectedPoint::new(100.0, 200.0, "EPSG:25830").expect("valid point");

        let east = origin.offset(5.0, 0.0);
        assert!((east.x() - 105.0).abs() < 1e-9);
        assert!((east.y() - 200.0).abs() < 1e-9);

        let north = origin.offset(10.0, FRAC_PI_2);
        assert!((north.x() - 100.0).abs() < 1e-9);
        assert!((north.y() - 210.0).abs() < 1e-9);
        assert_eq!(north.reference_system(), "EPSG:25830");
    }
}
