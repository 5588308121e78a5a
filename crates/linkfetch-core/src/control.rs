//! Batch abort token.
//!
//! The caller keeps one clone (e.g. a Ctrl-C handler) and the engine hands
//! another to its workers. Once abort is requested, workers stop taking new
//! links; links already in flight run to completion and are still reported.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct BatchControl {
    abort: Arc<AtomicBool>,
}

impl BatchControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_abort(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
    }
}
