//! Expanding ring search around a point that produced no parcel.
//!
//! The registry frequently answers nothing near parcel edges even though a
//! parcel lies a few metres away. [`RingSearch`] recovers by probing a fixed
//! lattice of offset points: every radius in ascending order, and for each
//! radius a fixed sequence of evenly spaced directions. The first probe that
//! yields a candidate wins, so the reported radius is always the smallest
//! one at which anything was found.
//!
//! The lattice is a lazy [`ProbeLattice`] iterator; probes are issued one at
//! a time and the search stops on the first success.

use std::f64::consts::TAU;

use log::{debug, warn};
use thiserror::Error;

use crate::{Located, ParcelCandidate, ParcelLocator, ProjectedPoint};

/// Radii probed by the default policy, in metres.
pub const DEFAULT_RADII_METERS: [f64; 5] = [5.0, 10.0, 25.0, 50.0, 100.0];

/// Directions probed per radius by the default policy.
pub const DEFAULT_DIRECTIONS: u16 = 8;

/// A single offset lookup generated by the lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchProbe {
    /// Distance from the original point, in metres.
    pub radius_meters: f64,
    /// Direction from the original point, counter-clockwise from east.
    pub angle_radians: f64,
    /// Offset point to query.
    pub point: ProjectedPoint,
}

/// Errors returned by [`RingSearchPolicy::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RingSearchPolicyError {
    /// No radii were supplied.
    #[error("ring search needs at least one radius")]
    NoRadii,
    /// A radius was zero, negative or not finite.
    #[error("ring search radius {radius} must be a positive finite number")]
    InvalidRadius {
        /// The rejected radius.
        radius: f64,
    },
    /// Radii were not strictly ascending.
    #[error("ring search radii must ascend strictly ({previous} then {next})")]
    NotAscending {
        /// Radius preceding the violation.
        previous: f64,
        /// Radius that did not exceed its predecessor.
        next: f64,
    },
    /// Zero directions were requested.
    #[error("ring search needs at least one direction per radius")]
    NoDirections,
}

/// Radii and directions explored by a [`RingSearch`].
///
/// The policy is fixed when the search is constructed and never varies per
/// call.
#[derive(Debug, Clone, PartialEq)]
pub struct RingSearchPolicy {
    radii: Vec<f64>,
    directions: u16,
}

impl Default for RingSearchPolicy {
    fn default() -> Self {
        Self {
            radii: DEFAULT_RADII_METERS.to_vec(),
            directions: DEFAULT_DIRECTIONS,
        }
    }
}

impl RingSearchPolicy {
    /// Validates and constructs a custom policy.
    ///
    /// # Errors
    /// Returns [`RingSearchPolicyError`] when `radii` is empty, contains a
    /// non-positive or non-finite value, is not strictly ascending, or when
    /// `directions` is zero.
    ///
    /// # Examples
    /// ```
    /// use parcela_core::RingSearchPolicy;
    ///
    /// let policy = RingSearchPolicy::new(vec![2.0, 4.0], 4).expect("valid policy");
    /// assert_eq!(policy.probe_budget(), 8);
    /// assert!(RingSearchPolicy::new(vec![4.0, 2.0], 4).is_err());
    /// ```
    pub fn new(radii: Vec<f64>, directions: u16) -> Result<Self, RingSearchPolicyError> {
        if radii.is_empty() {
            return Err(RingSearchPolicyError::NoRadii);
        }
        if directions == 0 {
            return Err(RingSearchPolicyError::NoDirections);
        }
        if let Some(&radius) = radii.iter().find(|r| !(r.is_finite() && **r > 0.0)) {
            return Err(RingSearchPolicyError::InvalidRadius { radius });
        }
        if let Some(pair) = radii.windows(2).find(|pair| pair.first() >= pair.last()) {
            let previous = pair.first().copied().unwrap_or_default();
            let next = pair.last().copied().unwrap_or_default();
            return Err(RingSearchPolicyError::NotAscending { previous, next });
        }
        Ok(Self { radii, directions })
    }

    /// Radii in ascending order, in metres.
    #[must_use]
    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    /// Number of directions probed per radius.
    #[must_use]
    pub const fn directions(&self) -> u16 {
        self.directions
    }

    /// Smallest radius probed.
    #[must_use]
    pub fn min_radius(&self) -> f64 {
        self.radii.first().copied().unwrap_or_default()
    }

    /// Largest radius probed.
    #[must_use]
    pub fn max_radius(&self) -> f64 {
        self.radii.last().copied().unwrap_or_default()
    }

    /// Worst-case number of lookups issued by one expansion.
    #[must_use]
    pub fn probe_budget(&self) -> usize {
        self.radii.len() * usize::from(self.directions)
    }

    /// Lazily enumerate the probes around `origin`.
    #[must_use]
    pub const fn probes<'a>(&'a self, origin: &'a ProjectedPoint) -> ProbeLattice<'a> {
        ProbeLattice {
            policy: self,
            origin,
            radius_index: 0,
            direction_index: 0,
        }
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "directions are evenly spaced fractions of a full turn"
    )]
    fn angle(&self, direction_index: u16) -> f64 {
        f64::from(direction_index) * TAU / f64::from(self.directions)
    }
}

/// Lazy sequence of [`SearchProbe`] values, radius-major.
///
/// # Examples
/// ```
/// use parcela_core::{ProjectedPoint, RingSearchPolicy};
///
/// let origin = ProjectedPoint::new(0.0, 0.0, "EPSG:25830").expect("valid point");
/// let policy = RingSearchPolicy::default();
/// let radii: Vec<f64> = policy.probes(&origin).map(|p| p.radius_meters).collect();
/// assert_eq!(radii.len(), 40);
/// assert_eq!(radii.first(), Some(&5.0));
/// assert_eq!(radii.last(), Some(&100.0));
/// ```
#[derive(Debug, Clone)]
pub struct ProbeLattice<'a> {
    policy: &'a RingSearchPolicy,
    origin: &'a ProjectedPoint,
    radius_index: usize,
    direction_index: u16,
}

impl ProbeLattice<'_> {
    fn remaining(&self) -> usize {
        let directions = usize::from(self.policy.directions);
        let consumed = self.radius_index * directions + usize::from(self.direction_index);
        self.policy.probe_budget().saturating_sub(consumed)
    }
}

impl Iterator for ProbeLattice<'_> {
    type Item = SearchProbe;

    fn next(&mut self) -> Option<Self::Item> {
        let radius_meters = self.policy.radii.get(self.radius_index).copied()?;
        let angle_radians = self.policy.angle(self.direction_index);

        self.direction_index += 1;
        if self.direction_index == self.policy.directions {
            self.direction_index = 0;
            self.radius_index += 1;
        }

        Some(SearchProbe {
            radius_meters,
            angle_radians,
            point: self.origin.offset(radius_meters, angle_radians),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ProbeLattice<'_> {}

/// Terminal state of a ring search.
#[derive(Debug, Clone, PartialEq)]
pub enum RingSearchOutcome {
    /// A probe produced a candidate.
    Found {
        /// First candidate reported by the successful probe.
        candidate: ParcelCandidate,
        /// Radius of the successful probe.
        radius_meters: f64,
        /// Probes issued, including the successful one.
        probes_attempted: usize,
        /// Probes that failed with a registry error.
        failed_probes: usize,
    },
    /// Every probe missed.
    Exhausted {
        /// Probes issued.
        probes_attempted: usize,
        /// Probes that failed with a registry error.
        failed_probes: usize,
    },
}

impl RingSearchOutcome {
    /// Probes that failed with a registry error.
    #[must_use]
    pub const fn failed_probes(&self) -> usize {
        match self {
            Self::Found { failed_probes, .. } | Self::Exhausted { failed_probes, .. } => {
                *failed_probes
            }
        }
    }

    /// Probes issued in total.
    #[must_use]
    pub const fn probes_attempted(&self) -> usize {
        match self {
            Self::Found {
                probes_attempted, ..
            }
            | Self::Exhausted {
                probes_attempted, ..
            } => *probes_attempted,
        }
    }
}

/// Sequential expanding search over a [`RingSearchPolicy`] lattice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RingSearch {
    policy: RingSearchPolicy,
}

impl RingSearch {
    /// Create a search using `policy`.
    #[must_use]
    pub const fn new(policy: RingSearchPolicy) -> Self {
        Self { policy }
    }

    /// The policy driving this search.
    #[must_use]
    pub const fn policy(&self) -> &RingSearchPolicy {
        &self.policy
    }

    /// Probe around `origin` until a candidate is found or the lattice is
    /// exhausted.
    ///
    /// Registry errors on individual probes are logged and counted but never
    /// abort the search.
    pub fn expand<L>(&self, locator: &L, origin: &ProjectedPoint) -> RingSearchOutcome
    where
        L: ParcelLocator + ?Sized,
    {
        let mut probes_attempted = 0;
        let mut failed_probes = 0;

        for probe in self.policy.probes(origin) {
            probes_attempted += 1;
            match locator.locate(&probe.point) {
                Ok(Located::Found(candidates)) => {
                    if let Some(candidate) = candidates.into_iter().next() {
                        debug!(
                            "ring search hit {} at radius {}m after {probes_attempted} probes",
                            candidate.reference, probe.radius_meters
                        );
                        return RingSearchOutcome::Found {
                            candidate,
                            radius_meters: probe.radius_meters,
                            probes_attempted,
                            failed_probes,
                        };
                    }
                }
                Ok(Located::Empty | Located::NotFound) => {}
                Err(err) => {
                    failed_probes += 1;
                    warn!(
                        "ring search probe at radius {}m, angle {:.3}rad failed: {err}",
                        probe.radius_meters, probe.angle_radians
                    );
                }
            }
        }

        debug!("ring search exhausted after {probes_attempted} probes");
        RingSearchOutcome::Exhausted {
            probes_attempted,
            failed_probes,
        }
    }
}
