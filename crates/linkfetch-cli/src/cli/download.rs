//! Runs one batch on a blocking thread while the runtime watches for Ctrl-C.

use anyhow::{Context, Result};
use linkfetch_core::config::HttpConfig;
use linkfetch_core::control::BatchControl;
use linkfetch_core::fetch::SchemeFetcher;
use linkfetch_core::{BatchResult, DownloadEngine, DownloadOptions};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub async fn run_download(options: DownloadOptions, http: HttpConfig) -> Result<(BatchResult, Duration)> {
    let control = BatchControl::new();
    let engine = DownloadEngine::new(Arc::new(SchemeFetcher::new(http))).with_control(control.clone());

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, not starting further links");
            eprintln!("Interrupted: waiting for links in flight...");
            control.request_abort();
        }
    });

    let started = Instant::now();
    let result = tokio::task::spawn_blocking(move || engine.download(&options))
        .await
        .context("download task join");
    interrupt.abort();
    Ok((result?, started.elapsed()))
}
