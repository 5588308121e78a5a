pub mod config;
pub mod logging;

pub mod control;
pub mod engine;
pub mod event;
pub mod fetch;
pub mod manifest;
pub mod outcome;
pub mod storage;
pub mod task;
pub mod throttle;

pub use engine::{DownloadEngine, DownloadOptions};
pub use event::{EventKind, LogEvent};
pub use outcome::{BatchResult, FetchOutcome};
