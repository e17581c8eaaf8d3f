//! Parcel detail extraction.
//!
//! The parcel data lookup has answered with at least two document shapes
//! over time. Each shape is handled by a named [`DetailStrategy`]; strategies
//! are tried in order and the first one yielding any field wins outright.

use std::fmt;

use log::debug;
use parcela_core::{DetailLookup, ParcelDetail, RegistryError};
use serde_json::Value;

use super::envelope::{self, DETAIL_ENVELOPE_KEYS, UpstreamFault};
use crate::NormalizedExtractor;

/// Address fragment paths, in assembly order: street type, street name,
/// number, block, stair, floor, door.
const ADDRESS_FRAGMENTS: [&str; 7] = [
    "dir.tv", "dir.nv", "dir.pnp", "loint.bq", "loint.es", "loint.pt", "loint.pu",
];

/// Named extraction rule for one document shape.
///
/// # Examples
/// ```
/// use parcela_data::DetailStrategy;
/// use serde_json::json;
///
/// let envelope = json!({"bi": {"uso": "Industrial", "superficie": "300"}});
/// let detail = DetailStrategy::FLAT.apply(&envelope).expect("flat shape");
///
/// assert_eq!(detail.primary_use.as_deref(), Some("Industrial"));
/// assert_eq!(detail.area_description.as_deref(), Some("300 m²"));
/// assert!(DetailStrategy::RICH.apply(&envelope).is_none());
/// ```
#[derive(Clone, Copy)]
pub struct DetailStrategy {
    name: &'static str,
    extract: fn(&Value) -> Option<ParcelDetail>,
}

impl DetailStrategy {
    /// Nested property record under `bico.bi` or `lrcdnp.rcdnp`.
    pub const RICH: Self = Self::new("rich", rich);

    /// Legacy flat fields under `bi` or at the envelope root.
    pub const FLAT: Self = Self::new("flat", flat);

    /// Build a strategy from a pure extraction function.
    #[must_use]
    pub const fn new(name: &'static str, extract: fn(&Value) -> Option<ParcelDetail>) -> Self {
        Self { name, extract }
    }

    /// Strategies in precedence order: rich before flat.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![Self::RICH, Self::FLAT]
    }

    /// Strategy name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Run the strategy against a result envelope.
    ///
    /// Returns `None` unless at least one field was extracted.
    #[must_use]
    pub fn apply(&self, envelope: &Value) -> Option<ParcelDetail> {
        (self.extract)(envelope).filter(|detail| !detail.is_empty())
    }
}

impl fmt::Debug for DetailStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetailStrategy")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Decode a parcel data payload.
///
/// A fault whose code is in `multiple_results_codes` still proceeds to
/// extraction; any other fault is a [`RegistryError::Service`].
pub(crate) fn decode(
    payload: &Value,
    multiple_results_codes: &[String],
    strategies: &[DetailStrategy],
) -> Result<DetailLookup, RegistryError> {
    let scoped = envelope::open(payload, DETAIL_ENVELOPE_KEYS);
    if let Some(fault) = UpstreamFault::read(&scoped) {
        if !fault.is_one_of(multiple_results_codes) {
            return Err(fault.into());
        }
        debug!("registry listed several properties; using the first");
    }

    let found = strategies.iter().find_map(|strategy| {
        strategy.apply(scoped.root()).inspect(|_| {
            debug!("parcel detail extracted by the {} strategy", strategy.name());
        })
    });
    Ok(found.map_or(DetailLookup::Empty, DetailLookup::Detailed))
}

fn rich(envelope: &Value) -> Option<ParcelDetail> {
    let property = NormalizedExtractor::new(envelope).scope(&["bico.bi", "lrcdnp.rcdnp"])?;
    let full_address = property
        .scope(&["dt.locs.lous.lourb"])
        .and_then(|urban| assemble_address(&urban))
        .or_else(|| property.text(&["ldt"]));
    Some(ParcelDetail {
        full_address,
        primary_use: property.text(&["debi.luso"]),
        area_description: property.text(&["debi.sfc"]).map(with_area_unit),
        construction_age: property.text(&["debi.ant"]),
        assessed_value: property.text(&["debi.vcat"]),
    })
}

fn flat(envelope: &Value) -> Option<ParcelDetail> {
    let root = NormalizedExtractor::new(envelope);
    let property = root.scope(&["bi"]).unwrap_or(root);
    Some(ParcelDetail {
        full_address: property.text(&["direccion", "domicilio"]),
        primary_use: property.text(&["uso"]),
        area_description: property.text(&["superficie"]).map(with_area_unit),
        construction_age: property.text(&["antiguedad"]),
        assessed_value: property.text(&["valor_catastral", "valorCatastral"]),
    })
}

/// Join the present address fragments with single spaces.
fn assemble_address(urban: &NormalizedExtractor<'_>) -> Option<String> {
    let fragments: Vec<String> = ADDRESS_FRAGMENTS
        .iter()
        .filter_map(|path| urban.text(&[*path]))
        .collect();
    (!fragments.is_empty()).then(|| fragments.join(" "))
}

/// Append the square-metre unit to purely numeric surfaces.
fn with_area_unit(raw: String) -> String {
    let numeric = raw.chars().any(|c| c.is_ascii_digit())
        && raw.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',');
    if numeric { format!("{raw} m²") } else { raw }
}
