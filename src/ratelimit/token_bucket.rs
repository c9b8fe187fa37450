//! Token bucket rate limiting.

use std::sync::Mutex;
use std::time::Instant;

use crate::ratelimit::Limiter;

struct TokenBucketState {
    tokens: i64,
    last_refill: Instant,
}

/// Token bucket: starts full, refills at `rate` whole tokens per second up
/// to `capacity`. Admits while a token is available, so bursts up to
/// `capacity` pass immediately.
pub struct TokenBucket {
    capacity: i64,
    rate: u32,
    state: Mutex<TokenBucketState>,
}

impl TokenBucket {
    pub fn new(rate: u32, capacity: u32) -> Self {
        Self {
            capacity: i64::from(capacity),
            rate,
            state: Mutex::new(TokenBucketState {
                tokens: i64::from(capacity),
                last_refill: Instant::now(),
            }),
        }
    }
}

impl Limiter for TokenBucket {
    fn allow(&self, now: Instant) -> bool {
        let mut state = self.state.lock().expect("token bucket state poisoned");

        let elapsed = now.saturating_duration_since(state.last_refill).as_secs_f64();
        state.last_refill = now;

        // Whole tokens only; fractional accrual is dropped with the anchor
        // update.
        let refill = (elapsed * f64::from(self.rate)) as i64;
        state.tokens = (state.tokens + refill).min(self.capacity);

        if state.tokens > 0 {
            state.tokens -= 1;
            true
        } else {
            false
        }
    }
}
