//! Decoding of coordinate distance-search answers.

use log::debug;
use parcela_core::{Located, ParcelCandidate, ParcelReference, RegistryError};
use serde_json::Value;

use super::envelope::{self, DISTANCE_ENVELOPE_KEYS, UpstreamFault};
use crate::NormalizedExtractor;

/// Decode a distance-search payload into candidates in upstream order.
///
/// A fault whose code is in `not_found_codes` is a [`Located::NotFound`];
/// any other fault is a [`RegistryError::Service`].
pub(crate) fn decode(payload: &Value, not_found_codes: &[String]) -> Result<Located, RegistryError> {
    let envelope = envelope::open(payload, DISTANCE_ENVELOPE_KEYS);
    if let Some(fault) = UpstreamFault::read(&envelope) {
        if fault.is_one_of(not_found_codes) {
            debug!("registry has no data here ({}: {})", fault.code, fault.description);
            return Ok(Located::NotFound);
        }
        return Err(fault.into());
    }

    let candidates = envelope
        .records(&["coordenadas_distancias.coordd", "coordenadas.coord"])
        .into_iter()
        .flat_map(flatten)
        .filter_map(candidate)
        .collect();
    Ok(Located::from_candidates(candidates))
}

/// Expand a record carrying an `lpcd` sub-list into its entries.
fn flatten(record: &Value) -> Vec<&Value> {
    let nested = NormalizedExtractor::new(record).records(&["lpcd"]);
    if nested.is_empty() {
        vec![record]
    } else {
        nested
    }
}

fn candidate(record: &Value) -> Option<ParcelCandidate> {
    let fields = NormalizedExtractor::new(record);
    let reference = ParcelReference::from_parts(
        fields.text(&["pc.pc1"]).as_deref(),
        fields.text(&["pc.pc2"]).as_deref(),
    );
    let Some(parsed) = reference else {
        debug!("skipping distance-search record without a complete reference");
        return None;
    };
    Some(ParcelCandidate::new(
        parsed,
        fields.text(&["ldt"]).unwrap_or_default(),
        fields.number(&["dis"]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn not_found_codes() -> Vec<String> {
        vec!["17".to_owned()]
    }

    fn references(located: &Located) -> Vec<&str> {
        match located {
            Located::Found(candidates) => candidates.iter().map(|c| c.reference.as_str()).collect(),
            Located::Empty | Located::NotFound => Vec::new(),
        }
    }

    #[rstest]
    fn nested_lists_flatten_in_order(not_found_codes: Vec<String>) {
        let payload = json!({
            "Consulta_RCCOOR_DistanciaResult": {
                "control": {"cuerr": 0, "cucoor": 3},
                "coordenadas_distancias": {"coordd": [{
                    "lpcd": [
                        {"pc": {"pc1": "1111111", "pc2": "AA1111A"}, "ldt": "CALLE UNO 1", "dis": "1,5"},
                        {"pc": {"pc1": "2222222", "pc2": "BB2222B"}, "ldt": "CALLE DOS 2", "dis": 3.25}
                    ]
                }, {
                    "pc": {"pc1": "3333333", "pc2": "CC3333C"}, "dis": "9"
                }]}
            }
        });

        let located = decode(&payload, &not_found_codes).expect("decodes");

        assert_eq!(
            references(&located),
            vec!["1111111AA1111A", "2222222BB2222B", "3333333CC3333C"]
        );
        let first = located.first().expect("first candidate");
        assert_eq!(first.location_label, "CALLE UNO 1");
        assert_eq!(first.distance_meters, Some(1.5));
        let Located::Found(candidates) = located else {
            panic!("expected candidates");
        };
        assert_eq!(candidates.last().map(|c| c.location_label.as_str()), Some(""));
    }

    #[rstest]
    fn single_record_is_accepted(not_found_codes: Vec<String>) {
        let payload = json!({
            "consulta_rccoor_distanciaResult": {
                "coordenadas_distancias": {"coordd": {"lpcd": {
                    "pc": {"pc1": "1234567", "pc2": "AB1234"}, "ldt": "CALLE MAYOR 5", "dis": "4.2"
                }}}
            }
        });

        let located = decode(&payload, &not_found_codes).expect("decodes");

        assert_eq!(references(&located), vec!["1234567AB1234"]);
    }

    #[rstest]
    fn incomplete_references_are_dropped(not_found_codes: Vec<String>) {
        let payload = json!({
            "coordenadas_distancias": {"coordd": [{"lpcd": [
                {"pc": {"pc1": "1234567"}, "ldt": "SIN PC2"},
                {"pc": {"pc1": "  ", "pc2": "AB1234"}}
            ]}]}
        });

        assert_eq!(decode(&payload, &not_found_codes), Ok(Located::Empty));
    }

    #[rstest]
    fn missing_candidate_list_is_empty(not_found_codes: Vec<String>) {
        let payload = json!({"Consulta_RCCOOR_DistanciaResult": {"control": {"cuerr": 0}}});
        assert_eq!(decode(&payload, &not_found_codes), Ok(Located::Empty));
    }

    #[rstest]
    fn configured_code_means_not_found(not_found_codes: Vec<String>) {
        let payload = json!({
            "Consulta_RCCOOR_DistanciaResult": {
                "control": {"cuerr": 1},
                "lerr": {"err": [{"cod": "17", "des": "NO HAY DATOS"}]}
            }
        });
        assert_eq!(decode(&payload, &not_found_codes), Ok(Located::NotFound));
    }

    #[rstest]
    fn other_codes_are_service_errors(not_found_codes: Vec<String>) {
        let payload = json!({
            "control": {"cuerr": 1},
            "lerr": {"err": {"cod": "11", "des": "LA COORDENADA X NO ES NUMERICA"}}
        });

        let err = decode(&payload, &not_found_codes).expect_err("service error");

        assert_eq!(
            err,
            RegistryError::Service {
                code: "11".to_owned(),
                description: "LA COORDENADA X NO ES NUMERICA".to_owned(),
            }
        );
        assert!(!err.is_transport());
    }
}
