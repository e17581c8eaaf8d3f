//! Deterministic registry doubles used by unit and behaviour tests.
//!
//! [`ScriptedLocator`] answers by call index, [`FnLocator`] answers by
//! point, and [`StubDetailSource`] returns one pre-configured detail result.
//! None of them perform I/O.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    DetailLookup, Located, ParcelCandidate, ParcelDetail, ParcelDetailSource, ParcelLocator,
    ParcelReference, ProjectedPoint, RegistryError,
};

/// Build a candidate with a synthetic label.
///
/// # Panics
/// Panics when `reference` is blank.
#[must_use]
pub fn candidate(reference: &str, distance_meters: f64) -> ParcelCandidate {
    let parsed = ParcelReference::parse(reference)
        .unwrap_or_else(|| panic!("candidate reference must not be blank"));
    ParcelCandidate::new(parsed, format!("LABEL {reference}"), Some(distance_meters))
}

/// Locator whose answers are scripted by call order.
///
/// Call `0` is the first lookup issued against the locator. Calls without a
/// scripted answer receive the default answer.
///
/// # Example
///
/// ```
/// use parcela_core::test_support::{ScriptedLocator, candidate};
/// use parcela_core::{Located, ParcelLocator, ProjectedPoint};
///
/// let locator = ScriptedLocator::missing().found_on_call(1, vec![candidate("REF", 2.0)]);
/// let point = ProjectedPoint::new(0.0, 0.0, "EPSG:25830").expect("valid point");
///
/// assert_eq!(locator.locate(&point), Ok(Located::Empty));
/// assert!(matches!(locator.locate(&point), Ok(Located::Found(_))));
/// assert_eq!(locator.calls(), 2);
/// ```
#[derive(Debug)]
pub struct ScriptedLocator {
    default: Result<Located, RegistryError>,
    scripted: HashMap<usize, Result<Located, RegistryError>>,
    calls: AtomicUsize,
    queried: Mutex<Vec<ProjectedPoint>>,
}

impl ScriptedLocator {
    /// A locator answering [`Located::Empty`] unless scripted otherwise.
    #[must_use]
    pub fn missing() -> Self {
        Self::with_default(Ok(Located::Empty))
    }

    /// A locator answering `default` unless scripted otherwise.
    #[must_use]
    pub fn with_default(default: Result<Located, RegistryError>) -> Self {
        Self {
            default,
            scripted: HashMap::new(),
            calls: AtomicUsize::new(0),
            queried: Mutex::new(Vec::new()),
        }
    }

    /// Answer call `index` with the given candidates.
    #[must_use]
    pub fn found_on_call(self, index: usize, candidates: Vec<ParcelCandidate>) -> Self {
        self.answer_on_call(index, Ok(Located::from_candidates(candidates)))
    }

    /// Answer call `index` with `error`.
    #[must_use]
    pub fn failing_on_call(self, index: usize, error: RegistryError) -> Self {
        self.answer_on_call(index, Err(error))
    }

    /// Answer call `index` with an arbitrary result.
    #[must_use]
    pub fn answer_on_call(mut self, index: usize, answer: Result<Located, RegistryError>) -> Self {
        self.scripted.insert(index, answer);
        self
    }

    /// Number of lookups issued so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Points queried so far, in call order.
    #[must_use]
    pub fn queried_points(&self) -> Vec<ProjectedPoint> {
        self.queried
            .lock()
            .map(|points| points.clone())
            .unwrap_or_default()
    }
}

impl ParcelLocator for ScriptedLocator {
    fn locate(&self, point: &ProjectedPoint) -> Result<Located, RegistryError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut points) = self.queried.lock() {
            points.push(point.clone());
        }
        self.scripted
            .get(&index)
            .unwrap_or(&self.default)
            .clone()
    }
}

/// Locator delegating to a closure over the queried point.
#[derive(Debug)]
pub struct FnLocator<F> {
    answer: F,
    calls: AtomicUsize,
}

/// Wrap `answer` as a [`ParcelLocator`].
pub const fn locator_fn<F>(answer: F) -> FnLocator<F>
where
    F: Fn(&ProjectedPoint) -> Result<Located, RegistryError>,
{
    FnLocator {
        answer,
        calls: AtomicUsize::new(0),
    }
}

impl<F> FnLocator<F> {
    /// Number of lookups issued so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<F> ParcelLocator for FnLocator<F>
where
    F: Fn(&ProjectedPoint) -> Result<Located, RegistryError>,
{
    fn locate(&self, point: &ProjectedPoint) -> Result<Located, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.answer)(point)
    }
}

/// Detail source returning one pre-configured result.
#[derive(Debug)]
pub struct StubDetailSource {
    response: Result<DetailLookup, RegistryError>,
    requested: Mutex<Vec<ParcelReference>>,
}

impl StubDetailSource {
    /// A source returning `detail` (collapsed to empty when all fields are
    /// `None`).
    #[must_use]
    pub fn with_detail(detail: ParcelDetail) -> Self {
        Self::with_response(Ok(DetailLookup::from_detail(detail)))
    }

    /// A source whose fetches succeed without descriptive fields.
    #[must_use]
    pub fn empty() -> Self {
        Self::with_response(Ok(DetailLookup::Empty))
    }

    /// A source failing every fetch with `error`.
    #[must_use]
    pub fn with_error(error: RegistryError) -> Self {
        Self::with_response(Err(error))
    }

    fn with_response(response: Result<DetailLookup, RegistryError>) -> Self {
        Self {
            response,
            requested: Mutex::new(Vec::new()),
        }
    }

    /// References requested so far, in call order.
    #[must_use]
    pub fn requested(&self) -> Vec<ParcelReference> {
        self.requested
            .lock()
            .map(|refs| refs.clone())
            .unwrap_or_default()
    }
}

impl ParcelDetailSource for StubDetailSource {
    fn fetch_detail(&self, reference: &ParcelReference) -> Result<DetailLookup, RegistryError> {
        if let Ok(mut refs) = self.requested.lock() {
            refs.push(reference.clone());
        }
        self.response.clone()
    }
}
