//! Fixed window rate limiting.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::ratelimit::Limiter;

/// Window length. A client gets `rate` admissions per window.
const WINDOW: Duration = Duration::from_secs(1);

struct FixedWindowState {
    count: u32,
    window_start: Instant,
}

/// Fixed window counter: up to `rate` admissions per one-second window,
/// counter reset when the window rolls over. Up to 2x `rate` can land
/// across a window edge; that artifact is inherent to the algorithm and
/// left as-is.
pub struct FixedWindow {
    rate: u32,
    state: Mutex<FixedWindowState>,
}

impl FixedWindow {
    pub fn new(rate: u32) -> Self {
        Self {
            rate,
            state: Mutex::new(FixedWindowState {
                count: 0,
                window_start: Instant::now(),
            }),
        }
    }
}

impl Limiter for FixedWindow {
    fn allow(&self, now: Instant) -> bool {
        let mut state = self.state.lock().expect("fixed window state poisoned");

        if now.saturating_duration_since(state.window_start) > WINDOW {
            state.window_start = now;
            state.count = 0;
        }

        if state.count < self.rate {
            state.count += 1;
            true
        } else {
            false
        }
    }
}
