//! One link's work: fetch once into the primary destination, then copy that
//! file to every other destination of the same link.
//!
//! Every failure ends up as a [`LogEvent`] in the returned [`FetchOutcome`];
//! nothing here returns an error to the pool.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::event::LogEvent;
use crate::fetch::Fetcher;
use crate::manifest::LinkGroup;
use crate::outcome::FetchOutcome;
use crate::storage;
use crate::throttle::Throttle;

/// Everything a task needs besides its own link group. Shared by all workers.
pub struct TaskContext {
    output_dir: PathBuf,
    fetcher: Arc<dyn Fetcher>,
    throttle: Throttle,
}

impl TaskContext {
    pub fn new(output_dir: impl Into<PathBuf>, fetcher: Arc<dyn Fetcher>, throttle: Throttle) -> Self {
        Self {
            output_dir: output_dir.into(),
            fetcher,
            throttle,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchTask {
    group: LinkGroup,
}

impl FetchTask {
    pub fn new(group: LinkGroup) -> Self {
        Self { group }
    }

    pub fn link(&self) -> &str {
        self.group.link()
    }

    pub fn run(&self, ctx: &TaskContext) -> FetchOutcome {
        let primary = self.group.primary();
        let primary_path = storage::destination_path(&ctx.output_dir, primary);

        let stream = match ctx.fetcher.fetch(self.link()) {
            Ok(stream) => stream,
            Err(e) => return self.primary_failed(e),
        };
        let mut stream = ctx.throttle.wrap(stream);
        let byte_count = match storage::write_replacing(&mut stream, &primary_path) {
            Ok(n) => n,
            Err(e) => return self.primary_failed(format_args!("{:#}", e)),
        };
        drop(stream);
        tracing::debug!(link = self.link(), dest = primary, bytes = byte_count, "fetched");

        let mut events = Vec::with_capacity(self.group.destinations().len());
        events.push(LogEvent::success(primary));
        for dest in self.group.replicas() {
            events.push(self.replicate(ctx, &primary_path, dest));
        }
        FetchOutcome::fetched(byte_count, events)
    }

    fn primary_failed(&self, err: impl fmt::Display) -> FetchOutcome {
        let primary = self.group.primary();
        tracing::warn!(link = self.link(), dest = primary, "fetch failed: {}", err);
        FetchOutcome::failed(LogEvent::fail(format!("{}: {}", primary, err)))
    }

    fn replicate(&self, ctx: &TaskContext, primary_path: &Path, dest: &str) -> LogEvent {
        let primary = self.group.primary();
        let path = storage::destination_path(&ctx.output_dir, dest);
        match storage::copy_no_clobber(primary_path, &path) {
            Ok(_) => {
                tracing::debug!(dest, from = primary, "replicated");
                LogEvent::success(format!("{} copy from {}", dest, primary))
            }
            Err(e) => {
                tracing::warn!(dest, from = primary, "replication failed: {:#}", e);
                LogEvent::fail(format!("{} copy from {}: {:#}", dest, primary, e))
            }
        }
    }
}
