use std::path::{Path, PathBuf};

/// One batch invocation: where the manifest is, where files go, and how hard
/// to push the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    pub links_file: PathBuf,
    /// Empty means the current directory.
    pub output_dir: PathBuf,
    pub threads: usize,
    /// Aggregate bytes per second; 0 disables throttling.
    pub speed_limit: u64,
    /// Presentation hint only; the engine always records every event.
    pub verbose: bool,
}

impl DownloadOptions {
    pub fn new(links_file: impl Into<PathBuf>) -> Self {
        Self {
            links_file: links_file.into(),
            output_dir: PathBuf::new(),
            threads: 1,
            speed_limit: 0,
            verbose: false,
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_speed_limit(mut self, bytes_per_sec: u64) -> Self {
        self.speed_limit = bytes_per_sec;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Worker count actually requested; `threads == 0` behaves like 1.
    pub fn worker_count(&self) -> usize {
        self.threads.max(1)
    }

    pub(crate) fn has_output_dir(&self) -> bool {
        self.output_dir != Path::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let o = DownloadOptions::new("links.txt");
        assert_eq!(o.links_file, PathBuf::from("links.txt"));
        assert!(!o.has_output_dir());
        assert_eq!(o.threads, 1);
        assert_eq!(o.speed_limit, 0);
        assert!(!o.verbose);
    }

    #[test]
    fn zero_threads_means_one_worker() {
        let o = DownloadOptions::new("l").with_threads(0);
        assert_eq!(o.worker_count(), 1);
        assert_eq!(o.with_threads(6).worker_count(), 6);
    }

    #[test]
    fn builder_sets_fields() {
        let o = DownloadOptions::new("l")
            .with_output_dir("out")
            .with_speed_limit(2048)
            .with_verbose(true);
        assert!(o.has_output_dir());
        assert_eq!(o.output_dir, PathBuf::from("out"));
        assert_eq!(o.speed_limit, 2048);
        assert!(o.verbose);
    }
}
