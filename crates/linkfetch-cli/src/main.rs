use std::process::ExitCode;

use linkfetch_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    // Stdout carries the report, so logs go to the state file (or stderr).
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("log file unavailable, logging to stderr: {:#}", err);
    }

    match Cli::run_from_args().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("linkfetch error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
