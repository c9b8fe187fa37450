//! Leaky bucket rate limiting.

use std::sync::Mutex;
use std::time::Instant;

use crate::ratelimit::Limiter;

struct LeakyBucketState {
    water: f64,
    last_check: Instant,
}

/// Leaky bucket: each admitted request adds one unit of water; the bucket
/// drains continuously at `rate` units per second. Admission requires room
/// below `capacity`, which smooths traffic instead of allowing bursts.
pub struct LeakyBucket {
    capacity: f64,
    rate: f64,
    state: Mutex<LeakyBucketState>,
}

impl LeakyBucket {
    pub fn new(rate: u32, capacity: u32) -> Self {
        Self {
            capacity: f64::from(capacity),
            rate: f64::from(rate),
            state: Mutex::new(LeakyBucketState {
                water: 0.0,
                last_check: Instant::now(),
            }),
        }
    }
}

impl Limiter for LeakyBucket {
    fn allow(&self, now: Instant) -> bool {
        let mut state = self.state.lock().expect("leaky bucket state poisoned");

        let elapsed = now.saturating_duration_since(state.last_check).as_secs_f64();
        state.last_check = now;

        state.water = (state.water - elapsed * self.rate).max(0.0);

        if state.water < self.capacity {
            state.water += 1.0;
            true
        } else {
            false
        }
    }
}
