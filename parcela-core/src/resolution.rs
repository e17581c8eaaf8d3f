//! Top-level parcel resolution.
//!
//! [`Resolver`] tries the exact point first, falls back to the
//! [`RingSearch`], and always attempts a detail fetch for whatever candidate
//! it settles on. Every degraded path leaves a note in the outcome's
//! diagnostic; nothing is raised to the caller.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    DetailLookup, Located, ParcelCandidate, ParcelDetail, ParcelDetailSource, ParcelLocator,
    ParcelReference, ProjectedPoint, RegistryError, RingSearch, RingSearchOutcome,
};

/// How candidates from one distance search are ordered before the first is
/// taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum CandidateOrder {
    /// Keep the registry's order, documented as nearest-first.
    #[default]
    Upstream,
    /// Stable sort by reported distance; unknown distances sort last.
    NearestReported,
}

/// Error returned when parsing an unknown [`CandidateOrder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown candidate order {0:?} (expected `upstream` or `nearest-reported`)")]
pub struct UnknownCandidateOrder(pub String);

impl FromStr for CandidateOrder {
    type Err = UnknownCandidateOrder;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "upstream" => Ok(Self::Upstream),
            "nearest-reported" | "nearest" => Ok(Self::NearestReported),
            _ => Err(UnknownCandidateOrder(raw.to_owned())),
        }
    }
}

impl fmt::Display for CandidateOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Upstream => "upstream",
            Self::NearestReported => "nearest-reported",
        })
    }
}

impl CandidateOrder {
    fn apply(self, candidates: &mut [ParcelCandidate]) {
        if self == Self::NearestReported {
            candidates.sort_by(|left, right| {
                match (left.distance_meters, right.distance_meters) {
                    (Some(l), Some(r)) => l.total_cmp(&r),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            });
        }
    }
}

/// Tunables for a [`Resolver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Ordering applied to every distance-search answer.
    pub candidate_order: CandidateOrder,
}

/// Result of one resolution request.
///
/// Absence of data is expressed through `None` fields and a human-readable
/// `diagnostic`, never through an error.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ResolutionOutcome {
    /// Reference of the resolved parcel.
    #[cfg_attr(feature = "serde", serde(rename = "referenceOriginal"))]
    pub reference: Option<ParcelReference>,
    /// Location label reported by the distance search.
    pub location_label: Option<String>,
    /// Distance reported by the distance search, in metres.
    pub distance_meters: Option<f64>,
    /// Descriptive attributes, when the detail fetch produced any.
    pub detail: Option<ParcelDetail>,
    /// Notes from every stage that degraded, joined with `"; "`.
    #[cfg_attr(feature = "serde", serde(rename = "message"))]
    pub diagnostic: Option<String>,
}

impl ResolutionOutcome {
    /// Whether a parcel reference was found.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.reference.is_some()
    }
}

/// Accumulates diagnostic notes in the order they were raised.
#[derive(Debug, Default)]
struct Notes(Vec<String>);

impl Notes {
    fn push(&mut self, note: impl Into<String>) {
        self.0.push(note.into());
    }

    fn into_message(self) -> Option<String> {
        (!self.0.is_empty()).then(|| self.0.join("; "))
    }
}

/// Applies the configured [`CandidateOrder`] to every lookup.
struct OrderedLocator<'a, L: ?Sized> {
    inner: &'a L,
    order: CandidateOrder,
}

impl<L: ParcelLocator + ?Sized> ParcelLocator for OrderedLocator<'_, L> {
    fn locate(&self, point: &ProjectedPoint) -> Result<Located, RegistryError> {
        match self.inner.locate(point)? {
            Located::Found(mut candidates) => {
                self.order.apply(&mut candidates);
                Ok(Located::from_candidates(candidates))
            }
            other @ (Located::Empty | Located::NotFound) => Ok(other),
        }
    }
}

/// Resolves projected points to cadastral parcels.
///
/// # Examples
/// ```
/// use parcela_core::test_support::{ScriptedLocator, StubDetailSource, candidate};
/// use parcela_core::{ProjectedPoint, Resolver};
///
/// let locator = ScriptedLocator::missing().found_on_call(0, vec![candidate("REF123", 0.0)]);
/// let details = StubDetailSource::empty();
/// let resolver = Resolver::new(locator, details);
///
/// let point = ProjectedPoint::new(440_000.0, 4_474_000.0, "EPSG:25830").expect("valid point");
/// let outcome = resolver.resolve(&point);
///
/// assert_eq!(outcome.reference.map(|r| r.to_string()), Some("REF123".to_owned()));
/// assert_eq!(
///     outcome.diagnostic.as_deref(),
///     Some("detail fetch returned no descriptive fields")
/// );
/// ```
#[derive(Debug)]
pub struct Resolver<L, D> {
    locator: L,
    details: D,
    ring_search: RingSearch,
    options: ResolverOptions,
}

impl<L, D> Resolver<L, D>
where
    L: ParcelLocator,
    D: ParcelDetailSource,
{
    /// Create a resolver with the default ring-search policy and options.
    #[must_use]
    pub fn new(locator: L, details: D) -> Self {
        Self {
            locator,
            details,
            ring_search: RingSearch::default(),
            options: ResolverOptions::default(),
        }
    }

    /// Replace the ring search.
    #[must_use]
    pub fn with_ring_search(mut self, ring_search: RingSearch) -> Self {
        self.ring_search = ring_search;
        self
    }

    /// Replace the options.
    #[must_use]
    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Borrow the locator.
    #[must_use]
    pub const fn locator(&self) -> &L {
        &self.locator
    }

    /// Borrow the detail source.
    #[must_use]
    pub const fn details(&self) -> &D {
        &self.details
    }

    /// Resolve `point` to the best matching parcel.
    ///
    /// Issues at most one exact-point lookup, one full ring search and one
    /// detail fetch. Never fails: upstream problems are folded into the
    /// outcome's diagnostic.
    #[must_use]
    pub fn resolve(&self, point: &ProjectedPoint) -> ResolutionOutcome {
        debug!(
            "resolving parcel at ({}, {}) in {}",
            point.x(),
            point.y(),
            point.reference_system()
        );
        let mut notes = Notes::default();
        let locator = OrderedLocator {
            inner: &self.locator,
            order: self.options.candidate_order,
        };

        let Some(candidate) = self.locate(&locator, point, &mut notes) else {
            info!("no parcel resolved near ({}, {})", point.x(), point.y());
            return ResolutionOutcome {
                diagnostic: notes.into_message(),
                ..ResolutionOutcome::default()
            };
        };

        let detail = self.describe(&candidate, &mut notes);
        info!("resolved parcel {}", candidate.reference);

        let ParcelCandidate {
            reference,
            location_label,
            distance_meters,
        } = candidate;
        ResolutionOutcome {
            reference: Some(reference),
            location_label: (!location_label.is_empty()).then_some(location_label),
            distance_meters,
            detail,
            diagnostic: notes.into_message(),
        }
    }

    fn locate(
        &self,
        locator: &OrderedLocator<'_, L>,
        point: &ProjectedPoint,
        notes: &mut Notes,
    ) -> Option<ParcelCandidate> {
        match locator.locate(point) {
            Ok(Located::Found(candidates)) => {
                if let Some(candidate) = candidates.into_iter().next() {
                    debug!("exact-point lookup found {}", candidate.reference);
                    return Some(candidate);
                }
            }
            Ok(Located::Empty) => debug!("exact-point lookup returned no candidates"),
            Ok(Located::NotFound) => debug!("registry holds no data at the exact point"),
            Err(err) => {
                warn!("exact-point lookup failed: {err}");
                notes.push(format!("exact-point lookup failed: {err}"));
            }
        }

        let outcome = self.ring_search.expand(locator, point);
        let failed_probes = outcome.failed_probes();
        let found = match outcome {
            RingSearchOutcome::Found {
                candidate,
                radius_meters,
                ..
            } => {
                notes.push(format!("resolved via expanded search, radius {radius_meters}m"));
                Some(candidate)
            }
            RingSearchOutcome::Exhausted { .. } => {
                let policy = self.ring_search.policy();
                notes.push(format!(
                    "no parcel found within {max}m of the requested point \
                     (searched radii {min}m to {max}m in {directions} directions)",
                    max = policy.max_radius(),
                    min = policy.min_radius(),
                    directions = policy.directions(),
                ));
                None
            }
        };
        match failed_probes {
            0 => {}
            1 => notes.push("1 expanded-search probe failed upstream"),
            n => notes.push(format!("{n} expanded-search probes failed upstream")),
        }
        found
    }

    fn describe(&self, candidate: &ParcelCandidate, notes: &mut Notes) -> Option<ParcelDetail> {
        match self.details.fetch_detail(&candidate.reference) {
            Ok(DetailLookup::Detailed(mut detail)) => {
                if detail.full_address.is_none() && !candidate.location_label.is_empty() {
                    detail.full_address = Some(candidate.location_label.clone());
                }
                Some(detail)
            }
            Ok(DetailLookup::Empty) => {
                notes.push("detail fetch returned no descriptive fields");
                None
            }
            Err(err) => {
                warn!("detail fetch for {} failed: {err}", candidate.reference);
                notes.push(format!("detail fetch failed: {err}"));
                None
            }
        }
    }
}
