//! Batch-wide bandwidth ceiling.
//!
//! One [`Throttle`] is built per `download` call and cloned into every task, so
//! all concurrent streams draw from the same [`TokenBucket`]. With no limit the
//! throttle holds no bucket and [`Throttle::wrap`] returns the stream as is.

mod bucket;
mod reader;

pub use bucket::TokenBucket;
pub use reader::ThrottledReader;

use std::sync::Arc;

use crate::fetch::ByteStream;

#[derive(Debug, Clone, Default)]
pub struct Throttle {
    bucket: Option<Arc<TokenBucket>>,
}

impl Throttle {
    /// `bytes_per_sec == 0` means unlimited.
    pub fn from_rate(bytes_per_sec: u64) -> Self {
        let bucket = (bytes_per_sec > 0).then(|| Arc::new(TokenBucket::new(bytes_per_sec)));
        Self { bucket }
    }

    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn rate(&self) -> Option<u64> {
        self.bucket.as_ref().map(|b| b.rate())
    }

    pub fn wrap(&self, stream: ByteStream) -> ByteStream {
        match &self.bucket {
            Some(bucket) => Box::new(ThrottledReader::new(stream, Arc::clone(bucket))),
            None => stream,
        }
    }
}
