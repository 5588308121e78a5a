//! Batch orchestration: validate the output directory, group the manifest,
//! fan the link groups out over a bounded pool and fold the outcomes.
//!
//! Batch-level failures (unusable output directory, unreadable manifest) come
//! back as a [`BatchResult`] holding exactly one SYSTEM_ERROR; `download`
//! itself never fails.

mod options;
mod pool;

pub use options::DownloadOptions;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::control::BatchControl;
use crate::fetch::{Fetcher, SchemeFetcher};
use crate::manifest::{self, LinkGroup};
use crate::outcome::BatchResult;
use crate::storage;
use crate::task::{FetchTask, TaskContext};
use crate::throttle::Throttle;

/// Where a batch is; only used to label log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchPhase {
    ValidatingOutputDir,
    GroupingManifest,
    Dispatching,
    Awaiting,
    Aggregated,
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchPhase::ValidatingOutputDir => "validating-output-dir",
            BatchPhase::GroupingManifest => "grouping-manifest",
            BatchPhase::Dispatching => "dispatching",
            BatchPhase::Awaiting => "awaiting",
            BatchPhase::Aggregated => "aggregated",
        };
        f.write_str(s)
    }
}

pub struct DownloadEngine {
    fetcher: Arc<dyn Fetcher>,
    control: BatchControl,
}

impl Default for DownloadEngine {
    fn default() -> Self {
        Self::new(Arc::new(SchemeFetcher::default()))
    }
}

impl DownloadEngine {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            control: BatchControl::new(),
        }
    }

    /// Share an abort token with the caller (e.g. a Ctrl-C handler).
    pub fn with_control(mut self, control: BatchControl) -> Self {
        self.control = control;
        self
    }

    /// Run a whole batch from `options.links_file`.
    pub fn download(&self, options: &DownloadOptions) -> BatchResult {
        if let Err(fatal) = prepare_output_dir(options) {
            return fatal;
        }

        tracing::debug!(phase = %BatchPhase::GroupingManifest, manifest = %options.links_file.display());
        let groups = match manifest::load_groups(&options.links_file) {
            Ok(groups) => groups,
            Err(e) => {
                tracing::warn!("manifest rejected: {}", e);
                return BatchResult::fatal(format!("Cannot read the file with links: {}", e));
            }
        };
        self.fetch_all(groups, options)
    }

    /// Run a batch over groups the caller already built. The output directory
    /// is validated the same way as in [`download`](Self::download);
    /// `options.links_file` is ignored.
    pub fn download_groups(&self, groups: Vec<LinkGroup>, options: &DownloadOptions) -> BatchResult {
        if let Err(fatal) = prepare_output_dir(options) {
            return fatal;
        }
        self.fetch_all(groups, options)
    }

    fn fetch_all(&self, groups: Vec<LinkGroup>, options: &DownloadOptions) -> BatchResult {
        let started = Instant::now();
        let throttle = Throttle::from_rate(options.speed_limit);
        let workers = options.worker_count();
        tracing::info!(
            phase = %BatchPhase::Dispatching,
            links = groups.len(),
            workers,
            rate = ?throttle.rate(),
            "starting batch"
        );

        let ctx = Arc::new(TaskContext::new(
            options.output_dir.clone(),
            Arc::clone(&self.fetcher),
            throttle,
        ));
        let tasks: Vec<FetchTask> = groups.into_iter().map(FetchTask::new).collect();
        tracing::debug!(phase = %BatchPhase::Awaiting);
        let result = pool::run_pool(tasks, ctx, workers, &self.control);

        tracing::info!(
            phase = %BatchPhase::Aggregated,
            bytes = result.total_bytes(),
            events = result.events().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch finished"
        );
        result
    }
}

fn prepare_output_dir(options: &DownloadOptions) -> Result<(), BatchResult> {
    if !options.has_output_dir() {
        return Ok(());
    }
    tracing::debug!(phase = %BatchPhase::ValidatingOutputDir, dir = %options.output_dir.display());
    storage::ensure_dir(&options.output_dir).map_err(|e| {
        tracing::warn!(dir = %options.output_dir.display(), "cannot create output directory: {}", e);
        BatchResult::fatal(format!(
            "Cannot create the output directory: {}: {}",
            options.output_dir.display(),
            e
        ))
    })
}
