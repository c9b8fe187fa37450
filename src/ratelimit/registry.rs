//! Per-client limiter registry.
//!
//! # Responsibilities
//! - Map client identity → limiter instance, creating lazily on first use
//! - Keep creation race-free: two first-seen requests for one identity
//!   must end up sharing a single limiter
//!
//! # Design Decisions
//! - Registry locking (dashmap shard) is separate from each limiter's own
//!   state mutex; the Arc is cloned out before the admission check runs
//! - No eviction: one limiter per distinct identity for the process
//!   lifetime, an accepted bound for this design

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;

use crate::ratelimit::{Limiter, LimiterKind};

/// Keyed registry handing each client identity its own limiter.
pub struct LimiterRegistry {
    limiters: DashMap<String, Arc<dyn Limiter>>,
    kind: LimiterKind,
    rate: u32,
    burst: u32,
}

impl LimiterRegistry {
    pub fn new(kind: LimiterKind, rate: u32, burst: u32) -> Self {
        Self {
            limiters: DashMap::new(),
            kind,
            rate,
            burst,
        }
    }

    /// Which algorithm this registry instantiates.
    pub fn kind(&self) -> LimiterKind {
        self.kind
    }

    /// Admission check for `client` against the wall clock.
    pub fn allow(&self, client: &str) -> bool {
        self.allow_at(client, Instant::now())
    }

    /// Admission check at an explicit time. Exposed for tests.
    pub fn allow_at(&self, client: &str, now: Instant) -> bool {
        let limiter = Arc::clone(
            &self
                .limiters
                .entry(client.to_string())
                .or_insert_with(|| self.kind.build(self.rate, self.burst)),
        );
        limiter.allow(now)
    }

    /// Number of distinct client identities seen so far.
    pub fn client_count(&self) -> usize {
        self.limiters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clients_do_not_share_budgets() {
        let registry = LimiterRegistry::new(LimiterKind::TokenBucket, 1, 2);
        let now = Instant::now();

        assert!(registry.allow_at("10.0.0.1", now));
        assert!(registry.allow_at("10.0.0.1", now));
        assert!(!registry.allow_at("10.0.0.1", now));

        // A different identity still has its full burst.
        assert!(registry.allow_at("10.0.0.2", now));
        assert_eq!(registry.client_count(), 2);
    }

    #[test]
    fn same_client_reuses_accumulated_state() {
        let registry = LimiterRegistry::new(LimiterKind::FixedWindow, 1, 0);
        let now = Instant::now();

        assert!(registry.allow_at("10.0.0.1", now));
        assert!(!registry.allow_at("10.0.0.1", now));
        assert_eq!(registry.client_count(), 1);
    }

    #[test]
    fn concurrent_first_seen_creates_one_limiter() {
        use std::thread;

        let registry = Arc::new(LimiterRegistry::new(LimiterKind::TokenBucket, 1, 8));
        let now = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || registry.allow_at("10.0.0.1", now))
            })
            .collect();

        let admitted = handles
            .into_iter()
            .filter_map(|h| h.join().ok())
            .filter(|admitted| *admitted)
            .count();

        // All eight drew from one shared bucket of capacity 8.
        assert_eq!(admitted, 8);
        assert_eq!(registry.client_count(), 1);
        assert!(!registry.allow_at("10.0.0.1", now));
    }
}
