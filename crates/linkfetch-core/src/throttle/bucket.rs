//! Token bucket shared by every reader of one batch.
//!
//! Tokens are bytes. They refill continuously at `rate` per second up to one
//! second's worth. Callers reserve tokens under a mutex; when the bucket runs
//! into deficit the caller sleeps for the time the deficit takes to refill, so
//! concurrent reservations are served in arrival order and never double-spend.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Largest single reservation is `rate / BURST_DIVISOR` bytes (100 ms worth).
const BURST_DIVISOR: u64 = 10;

#[derive(Debug)]
struct BucketState {
    /// May go negative: outstanding reservations not yet covered by refill.
    tokens: f64,
    last_refill: Instant,
}

#[derive(Debug)]
pub struct TokenBucket {
    rate: u64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Bucket refilling at `rate` bytes per second (at least 1). Starts empty,
    /// so the first second is throttled like every other.
    pub fn new(rate: u64) -> Self {
        Self {
            rate: rate.max(1),
            state: Mutex::new(BucketState {
                tokens: 0.0,
                last_refill: Instant::now(),
            }),
        }
    }

    pub fn rate(&self) -> u64 {
        self.rate
    }

    fn capacity(&self) -> f64 {
        self.rate as f64
    }

    /// Most bytes a single read may ask for.
    pub fn burst_ceiling(&self) -> usize {
        let ceiling = (self.rate / BURST_DIVISOR).max(1);
        usize::try_from(ceiling).unwrap_or(usize::MAX)
    }

    fn refill(&self, state: &mut BucketState, now: Instant) {
        let elapsed = now.saturating_duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.rate as f64).min(self.capacity());
        state.last_refill = now;
    }

    /// Take `n` tokens now and return how long the caller must wait before the
    /// bytes are covered. Zero when the bucket already held enough.
    pub fn reserve(&self, n: u64) -> Duration {
        self.reserve_at(n, Instant::now())
    }

    fn reserve_at(&self, n: u64, now: Instant) -> Duration {
        if n == 0 {
            return Duration::ZERO;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.refill(&mut state, now);
        state.tokens -= n as f64;
        if state.tokens >= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(-state.tokens / self.rate as f64)
        }
    }

    /// Block the calling thread until `n` bytes are paid for.
    pub fn acquire(&self, n: u64) {
        let wait = self.reserve(n);
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
    }
}
