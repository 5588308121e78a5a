//! Per-link outcomes and the batch-wide aggregate.
//!
//! Only the engine's dispatching thread mutates a [`BatchResult`]; workers hand
//! their [`FetchOutcome`] over a channel, so merging needs no locking.

use serde::Serialize;

use crate::event::{EventKind, LogEvent};

/// Result of running one link's task: bytes fetched once for the primary
/// destination plus every event the task produced, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    byte_count: u64,
    events: Vec<LogEvent>,
}

impl FetchOutcome {
    /// Primary fetch succeeded; `events` starts with the primary event.
    pub fn fetched(byte_count: u64, events: Vec<LogEvent>) -> Self {
        Self {
            byte_count,
            events,
        }
    }

    /// Primary fetch failed; no bytes are counted.
    pub fn failed(event: LogEvent) -> Self {
        Self {
            byte_count: 0,
            events: vec![event],
        }
    }

    /// Task never completed normally (panic, lost worker).
    pub fn system_error(message: impl Into<String>) -> Self {
        Self::failed(LogEvent::system_error(message))
    }

    pub fn byte_count(&self) -> u64 {
        self.byte_count
    }

    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }
}

/// Aggregate of a whole `download` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    total_bytes: u64,
    events: Vec<LogEvent>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Result of a batch aborted before any fetch: zero bytes, one system error.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            total_bytes: 0,
            events: vec![LogEvent::system_error(message)],
        }
    }

    /// Fold one task outcome into the aggregate.
    pub fn merge(&mut self, outcome: FetchOutcome) {
        self.total_bytes += outcome.byte_count;
        self.events.extend(outcome.events);
    }

    pub fn push(&mut self, event: LogEvent) {
        self.events.push(event);
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn has_system_error(&self) -> bool {
        self.count(EventKind::SystemError) > 0
    }

    /// Events to print for the given verbosity.
    pub fn visible_events(&self, verbose: bool) -> impl Iterator<Item = &LogEvent> {
        self.events.iter().filter(move |e| e.is_visible(verbose))
    }
}

impl FromIterator<FetchOutcome> for BatchResult {
    fn from_iter<I: IntoIterator<Item = FetchOutcome>>(iter: I) -> Self {
        let mut result = BatchResult::new();
        for outcome in iter {
            result.merge(outcome);
        }
        result
    }
}
