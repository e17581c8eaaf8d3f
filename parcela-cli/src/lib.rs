//! Command-line interface for the Parcela resolution engine.
//!
//! `parcela resolve` reads a projected point, resolves it against the
//! cadastral registry and prints the outcome as JSON on stdout.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod error;
mod resolve;

pub use error::{CliError, EXIT_FAILURE, EXIT_INVALID_INPUT};

const ARG_X: &str = "x";
const ARG_Y: &str = "y";
const ARG_SRS: &str = "srs";
const ARG_BASE_URL: &str = "base-url";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";
const ARG_USER_AGENT: &str = "user-agent";
const ARG_CANDIDATE_ORDER: &str = "candidate-order";
const ENV_X: &str = "PARCELA_CMDS_RESOLVE_X";
const ENV_Y: &str = "PARCELA_CMDS_RESOLVE_Y";
const ENV_SRS: &str = "PARCELA_CMDS_RESOLVE_SRS";

/// Run the Parcela CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments, configuration or the request are
/// invalid, or when the outcome cannot be written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging(cli.verbose)?;
    match cli.command {
        Command::Resolve(args) => resolve::run_resolve(args),
    }
}

/// Install the stderr log subscriber and bridge `log` records into it.
///
/// `RUST_LOG` is honoured unless `verbose` forces debug output.
fn init_logging(verbose: bool) -> Result<(), CliError> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init()
        .map_err(|err| CliError::InitLogging {
            message: err.to_string(),
        })
}

#[derive(Debug, Parser)]
#[command(
    name = "parcela",
    about = "Resolve projected coordinates to cadastral parcels",
    version
)]
struct Cli {
    /// Log registry traffic and resolution steps at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve one point to the parcel that best corresponds to it.
    Resolve(resolve::ResolveArgs),
}

#[cfg(test)]
mod tests;
