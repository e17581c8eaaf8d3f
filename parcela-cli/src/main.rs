//! Entry point for the `parcela` binary.
#![forbid(unsafe_code)]

use std::process::ExitCode;

use parcela_cli::CliError;

#[expect(
    clippy::print_stderr,
    reason = "fatal errors are reported to the operator on stderr"
)]
fn main() -> ExitCode {
    match parcela_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("parcela: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
