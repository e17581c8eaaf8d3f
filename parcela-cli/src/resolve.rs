//! Resolve command implementation for the Parcela CLI.

use std::io::{BufReader, Read, Write};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use clap::Parser;
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use parcela_core::{
    CandidateOrder, ParcelDetailSource, ParcelLocator, ProjectedPoint, ResolutionOutcome,
    Resolver, ResolverOptions,
};
use parcela_data::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, RegistryClient, RegistryClientConfig};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_BASE_URL, ARG_CANDIDATE_ORDER, ARG_SRS, ARG_TIMEOUT_SECS, ARG_USER_AGENT, ARG_X, ARG_Y,
    CliError, ENV_SRS, ENV_X, ENV_Y,
};

/// Request path meaning "read the request from stdin".
const STDIN_PATH: &str = "-";

/// CLI arguments for the `resolve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Resolve a projected point to the cadastral parcel that best \
                 corresponds to it. The point comes from a JSON request \
                 ({\"x\", \"y\", \"referenceSystemId\"}) read from a file or \
                 from stdin when the path is `-`, or from --x, --y and --srs. \
                 A request path takes precedence over the point flags.",
    about = "Resolve a projected point to a cadastral parcel"
)]
#[ortho_config(prefix = "PARCELA")]
pub(crate) struct ResolveArgs {
    /// JSON request file, or `-` to read it from stdin.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Easting of the point in the reference system.
    #[arg(long = ARG_X, value_name = "metres", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) x: Option<f64>,
    /// Northing of the point in the reference system.
    #[arg(long = ARG_Y, value_name = "metres", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) y: Option<f64>,
    /// Reference-system identifier, e.g. `EPSG:25830`.
    #[arg(long = ARG_SRS, value_name = "id")]
    #[serde(default)]
    pub(crate) srs: Option<String>,
    /// Base URL of the cadastral registry.
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Per-request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// User agent sent to the registry.
    #[arg(long = ARG_USER_AGENT, value_name = "agent")]
    #[serde(default)]
    pub(crate) user_agent: Option<String>,
    /// Candidate ordering: `upstream` or `nearest-reported`.
    #[arg(long = ARG_CANDIDATE_ORDER, value_name = "order")]
    #[serde(default)]
    pub(crate) candidate_order: Option<CandidateOrder>,
}

impl ResolveArgs {
    pub(crate) fn into_config(self) -> Result<ResolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ResolveConfig::try_from(merged)
    }
}

/// Where the point to resolve comes from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RequestSource {
    /// A JSON request file.
    File(Utf8PathBuf),
    /// A JSON request on stdin.
    Stdin,
    /// Coordinates given as flags.
    Inline { x: f64, y: f64, srs: String },
}

/// Resolved `resolve` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct ResolveConfig {
    pub(crate) source: RequestSource,
    pub(crate) client: RegistryClientConfig,
    pub(crate) options: ResolverOptions,
}

impl TryFrom<ResolveArgs> for ResolveConfig {
    type Error = CliError;

    fn try_from(args: ResolveArgs) -> Result<Self, Self::Error> {
        let source = match args.request_path {
            Some(path) if path.as_str() == STDIN_PATH => RequestSource::Stdin,
            Some(path) => RequestSource::File(path),
            None => RequestSource::Inline {
                x: args.x.ok_or(CliError::MissingArgument {
                    field: ARG_X,
                    env: ENV_X,
                })?,
                y: args.y.ok_or(CliError::MissingArgument {
                    field: ARG_Y,
                    env: ENV_Y,
                })?,
                srs: args.srs.ok_or(CliError::MissingArgument {
                    field: ARG_SRS,
                    env: ENV_SRS,
                })?,
            },
        };

        let base_url = args
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let timeout = Duration::from_secs(args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let mut client = RegistryClientConfig::new(base_url).with_timeout(timeout);
        if let Some(user_agent) = args.user_agent {
            client = client.with_user_agent(user_agent);
        }

        Ok(Self {
            source,
            client,
            options: ResolverOptions {
                candidate_order: args.candidate_order.unwrap_or_default(),
            },
        })
    }
}

/// JSON shape of a resolution request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolveRequest {
    x: f64,
    y: f64,
    reference_system_id: String,
}

/// A registry answering both distance searches and detail lookups.
pub(crate) trait Registry: ParcelLocator + ParcelDetailSource {}

impl<T: ParcelLocator + ParcelDetailSource> Registry for T {}

/// Builds the registry used by the current resolve invocation.
pub(crate) trait RegistryBuilder {
    fn build(&self, config: &RegistryClientConfig) -> Result<Box<dyn Registry>, CliError>;
}

pub(crate) struct HttpRegistryBuilder;

impl RegistryBuilder for HttpRegistryBuilder {
    fn build(&self, config: &RegistryClientConfig) -> Result<Box<dyn Registry>, CliError> {
        let client = RegistryClient::with_config(config.clone()).map_err(|source| {
            CliError::BuildRegistryClient {
                base_url: config.base_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(client))
    }
}

pub(crate) fn run_resolve(args: ResolveArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let mut stdin = std::io::stdin().lock();
    run_resolve_with(args, &HttpRegistryBuilder, &mut stdin, &mut stdout)
}

pub(crate) fn run_resolve_with(
    args: ResolveArgs,
    builder: &dyn RegistryBuilder,
    input: &mut dyn Read,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let outcome = execute_resolve(&config, builder, input)?;
    write_outcome(writer, &outcome)
}

/// Validate the request before any client exists, then resolve it.
pub(crate) fn execute_resolve(
    config: &ResolveConfig,
    builder: &dyn RegistryBuilder,
    input: &mut dyn Read,
) -> Result<ResolutionOutcome, CliError> {
    let point = load_point(&config.source, input)?;
    debug!(
        "resolving ({}, {}) in {} against {}",
        point.x(),
        point.y(),
        point.reference_system(),
        config.client.base_url
    );
    let registry = builder.build(&config.client)?;
    let resolver = Resolver::new(&*registry, &*registry).with_options(config.options);
    Ok(resolver.resolve(&point))
}

/// Read and validate the point described by `source`.
pub(crate) fn load_point(
    source: &RequestSource,
    input: &mut dyn Read,
) -> Result<ProjectedPoint, CliError> {
    let request = match source {
        RequestSource::Inline { x, y, srs } => {
            return ProjectedPoint::new(*x, *y, srs.as_str()).map_err(CliError::from);
        }
        RequestSource::Stdin => {
            serde_json::from_reader::<_, ResolveRequest>(input).map_err(|source| {
                CliError::ParseRequest {
                    origin: "stdin".to_owned(),
                    source,
                }
            })?
        }
        RequestSource::File(path) => load_request_file(path)?,
    };
    ProjectedPoint::new(request.x, request.y, request.reference_system_id).map_err(CliError::from)
}

fn load_request_file(path: &Utf8Path) -> Result<ResolveRequest, CliError> {
    let file = fs_utf8::File::open_ambient(path, ambient_authority()).map_err(|source| {
        CliError::OpenRequest {
            path: path.to_path_buf(),
            source,
        }
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParseRequest {
        origin: path.to_string(),
        source,
    })
}

fn write_outcome(writer: &mut dyn Write, outcome: &ResolutionOutcome) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(outcome).map_err(CliError::SerialiseOutcome)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ResolveConfig, CliError> {
    let merged = ResolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ResolveConfig::try_from(merged)
}
