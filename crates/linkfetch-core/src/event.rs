//! Outcome records produced by fetch tasks and the engine.

use serde::Serialize;
use std::fmt;

/// Category of a [`LogEvent`]. Drives verbosity filtering and exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A destination file was written (fetched or replicated).
    Success,
    /// A single link or destination failed; the rest of the batch continues.
    Fail,
    /// The batch or the worker pool itself failed.
    SystemError,
}

impl EventKind {
    /// Short label used in the text report.
    pub fn label(self) -> &'static str {
        match self {
            EventKind::Success => "OK",
            EventKind::Fail => "FAIL",
            EventKind::SystemError => "ERROR",
        }
    }

    /// System errors are reported even without `--verbose`.
    pub fn always_shown(self) -> bool {
        self == EventKind::SystemError
    }
}

/// One immutable log entry: a kind and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LogEvent {
    kind: EventKind,
    message: String,
}

impl LogEvent {
    pub fn new(kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(EventKind::Success, message)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(EventKind::Fail, message)
    }

    pub fn system_error(message: impl Into<String>) -> Self {
        Self::new(EventKind::SystemError, message)
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the event belongs in a report printed with the given verbosity.
    pub fn is_visible(&self, verbose: bool) -> bool {
        verbose || self.kind.always_shown()
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.label(), self.message)
    }
}
