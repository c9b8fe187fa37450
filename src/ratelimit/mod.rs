//! Rate limiting subsystem.
//!
//! # Data Flow
//! ```text
//! Request arrives with a resolved client identity
//!     → registry.rs (one limiter per identity, created lazily)
//!     → Apply the admission algorithm:
//!         - token_bucket.rs (burst up to capacity, steady refill)
//!         - leaky_bucket.rs (continuous drain, smoothing)
//!         - fixed_window.rs (per-second counter)
//!     → allow / deny (deny is a throttling signal, not an error)
//! ```
//!
//! # Design Decisions
//! - `allow` takes the clock as a parameter, so the time math is testable
//!   without sleeping
//! - Admission never blocks; each limiter's state sits behind its own
//!   short mutex, separate from the registry's map locking
//! - The registry is constructor-injected, never process-global

pub mod fixed_window;
pub mod leaky_bucket;
pub mod registry;
pub mod token_bucket;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use self::fixed_window::FixedWindow;
use self::leaky_bucket::LeakyBucket;
use self::token_bucket::TokenBucket;

/// A per-client admission decision.
pub trait Limiter: Send + Sync {
    /// Whether one request may pass at `now`. Mutates only the limiter's
    /// own accounting state.
    fn allow(&self, now: Instant) -> bool;
}

/// The closed set of throttling algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimiterKind {
    TokenBucket,
    LeakyBucket,
    FixedWindow,
}

impl LimiterKind {
    /// Instantiate a limiter of this kind. `burst` is the bucket capacity
    /// for the bucket algorithms and is ignored by the fixed window.
    pub fn build(self, rate: u32, burst: u32) -> Arc<dyn Limiter> {
        match self {
            LimiterKind::TokenBucket => Arc::new(TokenBucket::new(rate, burst)),
            LimiterKind::LeakyBucket => Arc::new(LeakyBucket::new(rate, burst)),
            LimiterKind::FixedWindow => Arc::new(FixedWindow::new(rate)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LimiterKind::TokenBucket => "token_bucket",
            LimiterKind::LeakyBucket => "leaky_bucket",
            LimiterKind::FixedWindow => "fixed_window",
        }
    }
}

impl fmt::Display for LimiterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized limiter tag. Fatal at configuration time, so
/// a typo never degrades to unthrottled traffic.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown rate limiter '{0}': use token_bucket (token), leaky_bucket (leaky) or fixed_window (fixed)")]
pub struct UnknownLimiter(pub String);

impl FromStr for LimiterKind {
    type Err = UnknownLimiter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "token_bucket" | "token" => Ok(LimiterKind::TokenBucket),
            "leaky_bucket" | "leaky" => Ok(LimiterKind::LeakyBucket),
            "fixed_window" | "fixed" => Ok(LimiterKind::FixedWindow),
            other => Err(UnknownLimiter(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_tags() {
        assert_eq!("token".parse(), Ok(LimiterKind::TokenBucket));
        assert_eq!("leaky_bucket".parse(), Ok(LimiterKind::LeakyBucket));
        assert_eq!("fixed".parse(), Ok(LimiterKind::FixedWindow));
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let err = "sliding_log".parse::<LimiterKind>().unwrap_err();
        assert_eq!(err, UnknownLimiter("sliding_log".to_string()));
    }
}
