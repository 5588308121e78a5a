//! Rendering a finished batch for stdout.

use anyhow::{Context, Result};
use linkfetch_core::BatchResult;
use serde::Serialize;
use std::time::Duration;

use super::elapsed::format_elapsed;

/// Summary line followed by one `LABEL message` line per visible event.
pub fn render_text(result: &BatchResult, elapsed: Duration, verbose: bool) -> String {
    let mut out = format!(
        "Time elapsed: {} | Downloaded: {} bytes\n",
        format_elapsed(elapsed),
        result.total_bytes()
    );
    for event in result.visible_events(verbose) {
        out.push_str(&event.to_string());
        out.push('\n');
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    elapsed_secs: f64,
    #[serde(flatten)]
    result: &'a BatchResult,
}

/// Every event regardless of verbosity, plus the elapsed time in seconds.
pub fn render_json(result: &BatchResult, elapsed: Duration) -> Result<String> {
    let report = JsonReport {
        elapsed_secs: elapsed.as_secs_f64(),
        result,
    };
    serde_json::to_string_pretty(&report).context("serialize report")
}
