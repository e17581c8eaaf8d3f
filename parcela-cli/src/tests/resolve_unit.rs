//! Focused unit tests covering resolve configuration and request loading.

use super::helpers::{StubRegistryBuilder, write_utf8};
use super::*;
use crate::resolve::{
    RequestSource, ResolveArgs, ResolveConfig, config_from_layers_for_test, execute_resolve,
    load_point, run_resolve_with,
};
use camino::Utf8PathBuf;
use parcela_core::{CandidateOrder, ParcelDetail, PointError};
use parcela_data::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use rstest::rstest;
use std::time::Duration;
use tempfile::TempDir;

const REFERENCE: &str = "9872023VH5797S0001WX";

fn temp_root() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

fn inline_args() -> ResolveArgs {
    ResolveArgs {
        x: Some(440_123.5),
        y: Some(4_474_640.25),
        srs: Some("EPSG:25830".to_owned()),
        ..ResolveArgs::default()
    }
}

#[rstest]
#[case::missing_x(None, Some(1.0), Some("EPSG:25830"), ARG_X, ENV_X)]
#[case::missing_y(Some(1.0), None, Some("EPSG:25830"), ARG_Y, ENV_Y)]
#[case::missing_srs(Some(1.0), Some(2.0), None, ARG_SRS, ENV_SRS)]
fn converting_without_point_fields_errors(
    #[case] x: Option<f64>,
    #[case] y: Option<f64>,
    #[case] srs: Option<&str>,
    #[case] expected_field: &'static str,
    #[case] expected_env: &'static str,
) {
    let args = ResolveArgs {
        x,
        y,
        srs: srs.map(str::to_owned),
        ..ResolveArgs::default()
    };

    let err = ResolveConfig::try_from(args).expect_err("incomplete point should error");
    assert_eq!(err.exit_code(), EXIT_INVALID_INPUT);
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, expected_field);
            assert_eq!(env, expected_env);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn inline_flags_use_registry_defaults() {
    let config = ResolveConfig::try_from(inline_args()).expect("config should build");

    assert_eq!(
        config.source,
        RequestSource::Inline {
            x: 440_123.5,
            y: 4_474_640.25,
            srs: "EPSG:25830".to_owned(),
        }
    );
    assert_eq!(config.client.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.client.timeout, Duration::from_secs(30));
    assert_eq!(config.client.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(config.options.candidate_order, CandidateOrder::Upstream);
}

#[rstest]
#[case::stdin("-", None)]
#[case::file("request.json", Some("request.json"))]
fn request_path_takes_precedence_over_flags(#[case] path: &str, #[case] file: Option<&str>) {
    let args = ResolveArgs {
        request_path: Some(Utf8PathBuf::from(path)),
        ..inline_args()
    };

    let config = ResolveConfig::try_from(args).expect("config should build");
    let expected = file.map_or(RequestSource::Stdin, |name| {
        RequestSource::File(Utf8PathBuf::from(name))
    });
    assert_eq!(config.source, expected);
}

#[rstest]
fn registry_overrides_are_applied() {
    let args = ResolveArgs {
        base_url: Some("http://localhost:8080/catastro".to_owned()),
        timeout_secs: Some(5),
        user_agent: Some("parcela-test".to_owned()),
        candidate_order: Some(CandidateOrder::NearestReported),
        ..inline_args()
    };

    let config = ResolveConfig::try_from(args).expect("config should build");
    assert_eq!(config.client.base_url, "http://localhost:8080/catastro");
    assert_eq!(config.client.timeout, Duration::from_secs(5));
    assert_eq!(config.client.user_agent, "parcela-test");
    assert_eq!(
        config.options.candidate_order,
        CandidateOrder::NearestReported
    );
}

#[rstest]
fn load_point_reads_request_file() {
    let (_tmp, root) = temp_root();
    let path = root.join("request.json");
    write_utf8(
        &path,
        br#"{ "x": -3.70379, "y": 40.41678, "referenceSystemId": "EPSG:4258" }"#,
    );

    let point =
        load_point(&RequestSource::File(path), &mut std::io::empty()).expect("point should load");
    assert_eq!(point.x(), -3.70379);
    assert_eq!(point.y(), 40.41678);
    assert_eq!(point.reference_system(), "EPSG:4258");
}

#[rstest]
fn load_point_reads_stdin() {
    let mut input: &[u8] = br#"{"x": 1.5, "y": 2.5, "referenceSystemId": "EPSG:25830"}"#;

    let point = load_point(&RequestSource::Stdin, &mut input).expect("point should load");
    assert_eq!(point.x(), 1.5);
    assert_eq!(point.reference_system(), "EPSG:25830");
}

#[rstest]
#[case::malformed(&br"{ not json"[..])]
#[case::missing_field(&br#"{"x": 1.0, "referenceSystemId": "EPSG:25830"}"#[..])]
#[case::null_coordinate(&br#"{"x": null, "y": 1.0, "referenceSystemId": "EPSG:25830"}"#[..])]
#[case::string_coordinate(&br#"{"x": "1.0", "y": 1.0, "referenceSystemId": "EPSG:25830"}"#[..])]
fn unreadable_requests_are_parse_errors(#[case] payload: &[u8]) {
    let mut input = payload;

    let err = load_point(&RequestSource::Stdin, &mut input).expect_err("request should fail");
    assert_eq!(err.exit_code(), EXIT_INVALID_INPUT);
    match err {
        CliError::ParseRequest { origin, .. } => assert_eq!(origin, "stdin"),
        other => panic!("expected ParseRequest, found {other:?}"),
    }
}

#[rstest]
fn blank_reference_system_is_an_invalid_point() {
    let source = RequestSource::Inline {
        x: 1.0,
        y: 2.0,
        srs: "   ".to_owned(),
    };

    let err = load_point(&source, &mut std::io::empty()).expect_err("blank srs should fail");
    assert_eq!(err.exit_code(), EXIT_INVALID_INPUT);
    match err {
        CliError::InvalidPoint(PointError::EmptyReferenceSystem) => {}
        other => panic!("expected InvalidPoint, found {other:?}"),
    }
}

#[rstest]
fn missing_request_file_is_not_an_input_error() {
    let (_tmp, root) = temp_root();
    let path = root.join("absent.json");

    let err = load_point(&RequestSource::File(path.clone()), &mut std::io::empty())
        .expect_err("missing file should fail");
    assert_eq!(err.exit_code(), EXIT_FAILURE);
    match err {
        CliError::OpenRequest { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected OpenRequest, found {other:?}"),
    }
}

#[rstest]
fn invalid_requests_never_build_a_client() {
    let config = ResolveConfig::try_from(ResolveArgs {
        srs: Some(String::new()),
        ..inline_args()
    })
    .expect("config should build");
    let builder = StubRegistryBuilder::finding(REFERENCE, ParcelDetail::default());

    let err = execute_resolve(&config, &builder, &mut std::io::empty())
        .expect_err("blank srs should fail");
    assert!(matches!(err, CliError::InvalidPoint(_)));
    assert_eq!(builder.builds(), 0);
}

#[rstest]
fn execute_resolve_uses_configured_registry() {
    let config = ResolveConfig::try_from(ResolveArgs {
        base_url: Some("http://registry.test".to_owned()),
        ..inline_args()
    })
    .expect("config should build");
    let builder = StubRegistryBuilder::finding(
        REFERENCE,
        ParcelDetail {
            full_address: Some("CL MAYOR 1 MADRID".to_owned()),
            ..ParcelDetail::default()
        },
    );

    let outcome =
        execute_resolve(&config, &builder, &mut std::io::empty()).expect("resolution runs");
    assert_eq!(builder.builds(), 1);
    assert_eq!(builder.seen_base_url().as_deref(), Some("http://registry.test"));
    assert_eq!(
        outcome.reference.as_ref().map(|r| r.as_str()),
        Some(REFERENCE)
    );
    assert_eq!(
        outcome.location_label,
        Some(format!("LABEL {REFERENCE}"))
    );
    assert_eq!(
        outcome
            .detail
            .as_ref()
            .and_then(|detail| detail.full_address.as_deref()),
        Some("CL MAYOR 1 MADRID")
    );
    assert_eq!(outcome.distance_meters, Some(0.0));
    assert!(outcome.diagnostic.is_none());
}

#[rstest]
fn run_resolve_writes_pretty_json_line() {
    let builder = StubRegistryBuilder::finding(REFERENCE, ParcelDetail::default());
    let mut stdout = Vec::new();

    run_resolve_with(inline_args(), &builder, &mut std::io::empty(), &mut stdout)
        .expect("resolve should succeed");

    let text = String::from_utf8(stdout).expect("stdout utf-8");
    assert!(text.ends_with("}\n"));
    let printed: serde_json::Value = serde_json::from_str(&text).expect("output should be JSON");
    assert_eq!(printed["referenceOriginal"], REFERENCE);
    assert_eq!(printed["locationLabel"], format!("LABEL {REFERENCE}"));
    assert_eq!(printed["message"], "detail fetch returned no descriptive fields");
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "base_url": "http://from-file",
            "timeout_secs": 12,
            "srs": "EPSG:25830",
        }),
        None,
    );
    composer.push_environment(json!({
        "x": 1.0,
        "y": 2.0,
        "base_url": "http://from-env",
    }));
    composer.push_cli(json!({
        "y": 3.0,
        "candidate_order": "nearest-reported",
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(
        config.source,
        RequestSource::Inline {
            x: 1.0,
            y: 3.0,
            srs: "EPSG:25830".to_owned(),
        }
    );
    assert_eq!(config.client.base_url, "http://from-env");
    assert_eq!(config.client.timeout, Duration::from_secs(12));
    assert_eq!(
        config.options.candidate_order,
        CandidateOrder::NearestReported
    );
}

#[rstest]
fn invalid_config_layers_map_to_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "timeout_secs": "soon" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    assert_eq!(err.exit_code(), EXIT_FAILURE);
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn cli_parses_negative_coordinates() {
    let cli = Cli::try_parse_from([
        "parcela", "resolve", "--x", "-3.5", "--y", "-40.25", "--srs", "EPSG:4326",
    ])
    .expect("negative coordinates should parse");
    let Command::Resolve(args) = cli.command;
    assert_eq!(args.x, Some(-3.5));
    assert_eq!(args.y, Some(-40.25));
}

#[rstest]
fn cli_rejects_unknown_candidate_order() {
    let err = Cli::try_parse_from([
        "parcela",
        "resolve",
        "--candidate-order",
        "alphabetical",
    ])
    .expect_err("unknown ordering should be rejected");
    assert_eq!(
        CliError::ArgumentParsing(err).exit_code(),
        EXIT_INVALID_INPUT
    );
}
