//! Structured logging for the CLI.
//!
//! Stdout is reserved for the batch report, so events go to
//! `~/.local/state/linkfetch/linkfetch.log`, or to stderr when that file is
//! unavailable. `RUST_LOG` overrides the default filter.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,linkfetch=debug,linkfetch_core=debug";

fn subscriber<W>(writer: W, filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .finish()
}

fn install<W>(writer: W)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    subscriber(writer, filter).init();
}

/// Path of the log file under the XDG state directory, creating the directory.
fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("linkfetch")?;
    let path = xdg_dirs
        .place_state_file("linkfetch.log")
        .context("create log directory")?;
    Ok(path)
}

/// Append log events to the state-dir log file. Errors when the file cannot be
/// opened so the caller can fall back to [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;

    install(Arc::new(file));
    tracing::info!("linkfetch logging initialized at {}", path.display());
    Ok(())
}

pub fn init_logging_stderr() {
    install(std::io::stderr);
}
