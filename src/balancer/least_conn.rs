//! Least Connections load balancing strategy.

use std::sync::Arc;

use crate::balancer::backend::Backend;
use crate::balancer::{Strategy, StrategyKind};

/// Least connections selector.
///
/// Picks the alive backend with the fewest in-flight requests, first one
/// wins on ties. The winner's counter is incremented before returning so
/// the credit is visible to near-simultaneous selections; the dispatch
/// boundary releases it exactly once via the lease.
#[derive(Debug, Default)]
pub struct LeastConnections;

impl LeastConnections {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for LeastConnections {
    fn kind(&self) -> StrategyKind {
        StrategyKind::LeastConnections
    }

    fn next_backend(&self, backends: &[Arc<Backend>], _client_ip: &str) -> Option<Arc<Backend>> {
        let mut best: Option<(&Arc<Backend>, usize)> = None;

        for b in backends.iter().filter(|b| b.is_alive()) {
            let connections = b.connections();
            // Strictly-less keeps the first minimum in fleet order.
            match best {
                Some((_, fewest)) if connections >= fewest => {}
                _ => best = Some((b, connections)),
            }
        }

        let (winner, _) = best?;
        winner.acquire_connection();
        Some(winner.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn fleet(n: usize) -> Vec<Arc<Backend>> {
        (0..n)
            .map(|i| {
                let url = Url::parse(&format!("http://127.0.0.1:{}", 8080 + i)).unwrap();
                Arc::new(Backend::new(url, 1))
            })
            .collect()
    }

    #[test]
    fn picks_strict_minimum() {
        let lb = LeastConnections::new();
        let backends = fleet(3);
        backends[0].acquire_connection();
        backends[0].acquire_connection();
        backends[1].acquire_connection();

        let picked = lb.next_backend(&backends, "").unwrap();
        assert_eq!(picked.url(), backends[2].url());
    }

    #[test]
    fn increments_before_returning() {
        let lb = LeastConnections::new();
        let backends = fleet(2);

        let first = lb.next_backend(&backends, "").unwrap();
        assert_eq!(first.connections(), 1);

        // With no completions, consecutive selections spread out instead
        // of piling onto the same backend.
        let second = lb.next_backend(&backends, "").unwrap();
        assert_ne!(first.url(), second.url());
    }

    #[test]
    fn tie_breaks_by_fleet_order() {
        let lb = LeastConnections::new();
        let backends = fleet(3);
        let picked = lb.next_backend(&backends, "").unwrap();
        assert_eq!(picked.url(), backends[0].url());
    }

    #[test]
    fn busiest_never_chosen_while_idler_exists() {
        let lb = LeastConnections::new();
        let backends = fleet(3);
        backends[0].acquire_connection();
        backends[0].acquire_connection();
        backends[0].acquire_connection();

        for _ in 0..3 {
            let picked = lb.next_backend(&backends, "").unwrap();
            assert_ne!(picked.url(), backends[0].url());
        }
    }

    #[test]
    fn skips_dead_even_when_idle() {
        let lb = LeastConnections::new();
        let backends = fleet(2);
        backends[0].set_alive(false);
        backends[1].acquire_connection();

        let picked = lb.next_backend(&backends, "").unwrap();
        assert_eq!(picked.url(), backends[1].url());
    }

    #[test]
    fn all_dead_returns_none() {
        let lb = LeastConnections::new();
        let backends = fleet(2);
        for b in &backends {
            b.set_alive(false);
        }
        assert!(lb.next_backend(&backends, "").is_none());
    }
}
