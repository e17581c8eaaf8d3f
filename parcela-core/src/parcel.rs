//! Parcel identifiers, distance-search candidates and descriptive details.

use std::fmt;

/// Cadastral reference identifying a single parcel.
///
/// The registry issues references as two fixed-width components; the
/// reference is their exact concatenation with no separator.
///
/// # Examples
/// ```
/// use parcela_core::ParcelReference;
///
/// let reference = ParcelReference::from_parts(Some("1234567"), Some("AB1234"));
/// assert_eq!(reference.map(|r| r.to_string()), Some("1234567AB1234".to_owned()));
///
/// assert!(ParcelReference::from_parts(Some("1234567"), None).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ParcelReference(String);

impl ParcelReference {
    /// Join the two upstream components into a reference.
    ///
    /// Components are trimmed; `None` is returned unless both are present
    /// and non-blank.
    #[must_use]
    pub fn from_parts(part1: Option<&str>, part2: Option<&str>) -> Option<Self> {
        let first = part1.map(str::trim).filter(|part| !part.is_empty())?;
        let second = part2.map(str::trim).filter(|part| !part.is_empty())?;
        Some(Self(format!("{first}{second}")))
    }

    /// Wrap an already-joined reference, rejecting blank input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }

    /// Borrow the reference text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParcelReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ParcelReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One row returned by a distance search.
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelCandidate {
    /// Reference of the candidate parcel.
    pub reference: ParcelReference,
    /// Human-readable location label; empty when the upstream omitted it.
    pub location_label: String,
    /// Distance reported by the upstream, in metres.
    pub distance_meters: Option<f64>,
}

impl ParcelCandidate {
    /// Construct a candidate.
    pub fn new(
        reference: ParcelReference,
        location_label: impl Into<String>,
        distance_meters: Option<f64>,
    ) -> Self {
        Self {
            reference,
            location_label: location_label.into(),
            distance_meters,
        }
    }
}

/// Best-effort descriptive attributes of a parcel.
///
/// Every field is independently optional because the upstream document
/// shape varies between service revisions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ParcelDetail {
    /// Postal address assembled from structured fragments.
    pub full_address: Option<String>,
    /// Main use of the property, e.g. `Residencial`.
    pub primary_use: Option<String>,
    /// Built or plot surface.
    pub area_description: Option<String>,
    /// Construction year or age.
    pub construction_age: Option<String>,
    /// Assessed cadastral value.
    pub assessed_value: Option<String>,
}

impl ParcelDetail {
    /// Whether no field carries a value.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_address.is_none()
            && self.primary_use.is_none()
            && self.area_description.is_none()
            && self.construction_age.is_none()
            && self.assessed_value.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("1234567"), Some("AB1234"), Some("1234567AB1234"))]
    #[case(Some(" 1234567 "), Some("AB1234\n"), Some("1234567AB1234"))]
    #[case(Some("1234567"), None, None)]
    #[case(None, Some("AB1234"), None)]
    #[case(Some(""), Some("AB1234"), None)]
    #[case(Some("1234567"), Some("  "), None)]
    fn reference_joins_both_parts(
        #[case] part1: Option<&str>,
        #[case] part2: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let reference = ParcelReference::from_parts(part1, part2);
        assert_eq!(reference.as_ref().map(ParcelReference::as_str), expected);
    }

    #[rstest]
    fn parse_rejects_blank() {
        assert!(ParcelReference::parse("  ").is_none());
        assert_eq!(
            ParcelReference::parse("REF123").map(|r| r.to_string()),
            Some("REF123".to_owned())
        );
    }

    #[rstest]
    fn detail_emptiness_tracks_every_field() {
        assert!(ParcelDetail::default().is_empty());
        let detail = ParcelDetail {
            assessed_value: Some("1000".to_owned()),
            ..ParcelDetail::default()
        };
        assert!(!detail.is_empty());
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn detail_serialises_with_camel_case_keys() {
        let detail = ParcelDetail {
            primary_use: Some("Residential".to_owned()),
            ..ParcelDetail::default()
        };
        let json = serde_json::to_value(&detail).expect("serialise detail");
        assert_eq!(
            json,
            serde_json::json!({
                "fullAddress": null,
                "primaryUse": "Residential",
                "areaDescription": null,
                "constructionAge": null,
                "assessedValue": null,
            })
        );
    }
}
