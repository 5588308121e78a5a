//! In-memory fetcher that counts how often each link was opened.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;

use linkfetch_core::fetch::{ByteStream, FetchError, Fetcher};

#[derive(Default)]
pub struct MemoryFetcher {
    bodies: HashMap<String, Vec<u8>>,
    panics_on: Vec<String>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, link: &str, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(link.to_string(), body.into());
        self
    }

    /// Fetching `link` panics instead of returning.
    pub fn with_panic(mut self, link: &str) -> Self {
        self.panics_on.push(link.to_string());
        self
    }

    pub fn calls(&self, link: &str) -> usize {
        self.calls.lock().unwrap().get(link).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch(&self, link: &str) -> Result<ByteStream, FetchError> {
        *self.calls.lock().unwrap().entry(link.to_string()).or_insert(0) += 1;
        if self.panics_on.iter().any(|l| l == link) {
            panic!("fetcher blew up on {}", link);
        }
        match self.bodies.get(link) {
            Some(body) => Ok(Box::new(Cursor::new(body.clone()))),
            None => Err(FetchError::Status(404)),
        }
    }
}
