//! Locator and detail-source traits with their lookup results.

use crate::{ParcelCandidate, ParcelDetail, ParcelReference, ProjectedPoint};

use super::error::RegistryError;

/// Result of a successful distance search.
#[derive(Debug, Clone, PartialEq)]
pub enum Located {
    /// At least one candidate, in the order reported by the registry.
    Found(Vec<ParcelCandidate>),
    /// The registry answered but listed no usable candidates.
    Empty,
    /// The registry signalled that it holds no data for the coordinate.
    NotFound,
}

impl Located {
    /// Wrap candidates, collapsing an empty list into [`Located::Empty`].
    ///
    /// # Examples
    /// ```
    /// use parcela_core::Located;
    ///
    /// assert_eq!(Located::from_candidates(Vec::new()), Located::Empty);
    /// ```
    #[must_use]
    pub fn from_candidates(candidates: Vec<ParcelCandidate>) -> Self {
        if candidates.is_empty() {
            Self::Empty
        } else {
            Self::Found(candidates)
        }
    }

    /// First candidate, if any.
    #[must_use]
    pub fn first(&self) -> Option<&ParcelCandidate> {
        match self {
            Self::Found(candidates) => candidates.first(),
            Self::Empty | Self::NotFound => None,
        }
    }

    /// Take ownership of the candidate list, empty for misses.
    #[must_use]
    pub fn into_candidates(self) -> Vec<ParcelCandidate> {
        match self {
            Self::Found(candidates) => candidates,
            Self::Empty | Self::NotFound => Vec::new(),
        }
    }
}

/// Result of a successful detail fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailLookup {
    /// At least one descriptive field was extracted.
    Detailed(ParcelDetail),
    /// The fetch succeeded but no known document shape yielded a field.
    Empty,
}

impl DetailLookup {
    /// Wrap a detail, collapsing an all-`None` value into
    /// [`DetailLookup::Empty`].
    #[must_use]
    pub fn from_detail(detail: ParcelDetail) -> Self {
        if detail.is_empty() {
            Self::Empty
        } else {
            Self::Detailed(detail)
        }
    }
}

/// Find the parcels nearest to a projected point.
///
/// Implementations issue exactly one upstream query per call and never
/// retry; retry policy belongs to the caller.
///
/// # Examples
///
/// ```rust
/// use parcela_core::{
///     Located, ParcelCandidate, ParcelLocator, ParcelReference, ProjectedPoint, RegistryError,
/// };
///
/// struct Fixed;
///
/// impl ParcelLocator for Fixed {
///     fn locate(&self, _point: &ProjectedPoint) -> Result<Located, RegistryError> {
///         let reference = ParcelReference::parse("1234567AB1234").into_iter();
///         Ok(Located::from_candidates(
///             reference.map(|r| ParcelCandidate::new(r, "CALLE MAYOR 5", Some(1.0))).collect(),
///         ))
///     }
/// }
///
/// let point = ProjectedPoint::new(0.0, 0.0, "EPSG:25830")?;
/// let located = Fixed.locate(&point)?;
/// assert_eq!(located.first().map(|c| c.location_label.as_str()), Some("CALLE MAYOR 5"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait ParcelLocator {
    /// Query the registry for candidates at `point`.
    ///
    /// # Errors
    /// Returns [`RegistryError`] for functional or transport failures.
    fn locate(&self, point: &ProjectedPoint) -> Result<Located, RegistryError>;
}

/// Fetch descriptive attributes for a parcel.
pub trait ParcelDetailSource {
    /// Query the registry for the parcel identified by `reference`.
    ///
    /// # Errors
    /// Returns [`RegistryError`] for functional or transport failures.
    fn fetch_detail(&self, reference: &ParcelReference) -> Result<DetailLookup, RegistryError>;
}

impl<T: ParcelLocator + ?Sized> ParcelLocator for &T {
    fn locate(&self, point: &ProjectedPoint) -> Result<Located, RegistryError> {
        (**self).locate(point)
    }
}

impl<T: ParcelDetailSource + ?Sized> ParcelDetailSource for &T {
    fn fetch_detail(&self, reference: &ParcelReference) -> Result<DetailLookup, RegistryError> {
        (**self).fetch_detail(reference)
    }
}

impl<T: ParcelLocator + ?Sized> ParcelLocator for Box<T> {
    fn locate(&self, point: &ProjectedPoint) -> Result<Located, RegistryError> {
        (**self).locate(point)
    }
}

impl<T: ParcelDetailSource + ?Sized> ParcelDetailSource for Box<T> {
    fn fetch_detail(&self, reference: &ParcelReference) -> Result<DetailLookup, RegistryError> {
        (**self).fetch_detail(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn candidate(reference: &str) -> ParcelCandidate {
        let parsed = ParcelReference::parse(reference).expect("valid reference");
        ParcelCandidate::new(parsed, "label", None)
    }

    #[rstest]
    fn from_candidates_keeps_order() {
        let located = Located::from_candidates(vec![candidate("A"), candidate("B")]);
        assert_eq!(located.first().map(|c| c.reference.as_str()), Some("A"));
        assert_eq!(located.into_candidates().len(), 2);
    }

    #[rstest]
    fn misses_have_no_first_candidate() {
        assert!(Located::Empty.first().is_none());
        assert!(Located::NotFound.first().is_none());
        assert!(Located::NotFound.into_candidates().is_empty());
    }

    #[rstest]
    fn empty_detail_collapses() {
        assert_eq!(
            DetailLookup::from_detail(ParcelDetail::default()),
            DetailLookup::Empty
        );
    }
}
