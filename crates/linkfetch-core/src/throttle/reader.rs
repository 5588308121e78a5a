use std::io::{self, Read};
use std::sync::Arc;

use super::bucket::TokenBucket;

/// Reader that pays the shared bucket for every byte before handing it out.
/// Each call reads at most [`TokenBucket::burst_ceiling`] bytes.
pub struct ThrottledReader<R> {
    inner: R,
    bucket: Arc<TokenBucket>,
}

impl<R: Read> ThrottledReader<R> {
    pub fn new(inner: R, bucket: Arc<TokenBucket>) -> Self {
        Self { inner, bucket }
    }
}

impl<R: Read> Read for ThrottledReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let granted = buf.len().min(self.bucket.burst_ceiling());
        let n = self.inner.read(&mut buf[..granted])?;
        self.bucket.acquire(n as u64);
        Ok(n)
    }
}
