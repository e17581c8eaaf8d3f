//! Error types emitted by the Parcela CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use parcela_core::PointError;
use parcela_data::ClientBuildError;
use thiserror::Error;

/// Exit status for malformed or incomplete resolution requests.
pub const EXIT_INVALID_INPUT: u8 = 2;

/// Exit status for every other failure.
pub const EXIT_FAILURE: u8 = 1;

/// Errors emitted by the Parcela CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name without the leading dashes.
        field: &'static str,
        /// Environment variable that can supply the value.
        env: &'static str,
    },
    /// Opening the request file failed.
    #[error("failed to open resolution request at {path:?}: {source}")]
    OpenRequest {
        /// Request file path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The request JSON was malformed or had missing or wrong-typed fields.
    #[error("failed to parse resolution request from {origin}: {source}")]
    ParseRequest {
        /// Where the request was read from.
        origin: String,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// The request decoded but does not describe a usable point.
    #[error("invalid point: {0}")]
    InvalidPoint(#[from] PointError),
    /// Installing the log subscriber failed.
    #[error("failed to initialise logging: {message}")]
    InitLogging {
        /// Subscriber error message.
        message: String,
    },
    /// Constructing the registry client failed.
    #[error("failed to build registry client for {base_url:?}: {source}")]
    BuildRegistryClient {
        /// Configured base URL.
        base_url: String,
        /// Construction error.
        #[source]
        source: ClientBuildError,
    },
    /// Serialising the resolution outcome failed.
    #[error("failed to serialise resolution outcome: {0}")]
    SerialiseOutcome(#[source] serde_json::Error),
    /// Writing the resolution outcome failed.
    #[error("failed to write resolution outcome: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl CliError {
    /// Process exit status for this error.
    ///
    /// Input validation failures exit with [`EXIT_INVALID_INPUT`]; anything
    /// else exits with [`EXIT_FAILURE`].
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::ArgumentParsing(_)
            | Self::MissingArgument { .. }
            | Self::ParseRequest { .. }
            | Self::InvalidPoint(_) => EXIT_INVALID_INPUT,
            Self::Configuration(_)
            | Self::OpenRequest { .. }
            | Self::InitLogging { .. }
            | Self::BuildRegistryClient { .. }
            | Self::SerialiseOutcome(_)
            | Self::WriteOutput(_) => EXIT_FAILURE,
        }
    }
}
