//! Result envelopes and the registry's in-band status block.

use parcela_core::RegistryError;
use serde_json::Value;

use crate::NormalizedExtractor;

/// Envelope keys of the distance search, PascalCase first.
pub(crate) const DISTANCE_ENVELOPE_KEYS: &[&str] = &[
    "Consulta_RCCOOR_DistanciaResult",
    "consulta_rccoor_distanciaResult",
];

/// Envelope keys of the parcel data lookup, lowercase first.
pub(crate) const DETAIL_ENVELOPE_KEYS: &[&str] = &["consulta_dnprcResult", "Consulta_DNPRCResult"];

/// Scope `payload` to its result envelope.
///
/// A payload carrying none of `keys` is treated as the envelope itself.
pub(crate) fn open<'a>(payload: &'a Value, keys: &[&str]) -> NormalizedExtractor<'a> {
    let root = NormalizedExtractor::new(payload);
    root.scope(keys).unwrap_or(root)
}

/// Functional error reported inside a successful HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UpstreamFault {
    pub(crate) code: String,
    pub(crate) description: String,
}

impl UpstreamFault {
    /// Read the status block of `envelope`.
    ///
    /// A non-zero `control.cuerr` or any listed error code is a fault; the
    /// first listed error supplies the code and description.
    pub(crate) fn read(envelope: &NormalizedExtractor<'_>) -> Option<Self> {
        let error_count = envelope.number(&["control.cuerr"]).unwrap_or_default();
        let code = envelope.text(&["lerr.err.cod", "lerr.cod"]);
        if error_count <= 0.0 && code.is_none() {
            return None;
        }
        Some(Self {
            code: code.unwrap_or_else(|| "unknown".to_owned()),
            description: envelope
                .text(&["lerr.err.des", "lerr.des"])
                .unwrap_or_else(|| "no description".to_owned()),
        })
    }

    /// Whether the code is one of `codes`.
    pub(crate) fn is_one_of(&self, codes: &[String]) -> bool {
        codes.iter().any(|code| code.trim() == self.code)
    }
}

impl From<UpstreamFault> for RegistryError {
    fn from(fault: UpstreamFault) -> Self {
        Self::Service {
            code: fault.code,
            description: fault.description,
        }
    }
}
