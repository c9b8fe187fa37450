//! Round-robin load balancing strategy.

use std::sync::{Arc, Mutex};

use crate::balancer::backend::Backend;
use crate::balancer::{Strategy, StrategyKind};

/// Round-robin selector.
///
/// The cursor and the scan that advances it share one critical section:
/// two concurrent calls must never be handed the same backend when a
/// rotation should have moved past it.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: Mutex<usize>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for RoundRobin {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RoundRobin
    }

    fn next_backend(&self, backends: &[Arc<Backend>], _client_ip: &str) -> Option<Arc<Backend>> {
        let n = backends.len();
        if n == 0 {
            return None;
        }

        let mut cursor = self.cursor.lock().expect("round robin cursor poisoned");
        // The cursor may point past the end after a removal; the modulo
        // below brings it back into range.
        let start = *cursor;
        for i in 0..n {
            let index = (start + i) % n;
            if backends[index].is_alive() {
                *cursor = (index + 1) % n;
                return Some(backends[index].clone());
            }
        }
        None
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
    fn visits_each_backend_once_per_rotation() {
        let lb = RoundRobin::new();
        let backends = fleet(3);

        for round in 0..2 {
            for expected in &backends {
                let picked = lb.next_backend(&backends, "").unwrap();
                assert_eq!(
                    picked.url(),
                    expected.url(),
                    "round {} broke fleet order",
                    round
                );
            }
        }
    }

    #[test]
    fn skips_dead_backends() {
        let lb = RoundRobin::new();
        let backends = fleet(3);
        backends[1].set_alive(false);

        let first = lb.next_backend(&backends, "").unwrap();
        let second = lb.next_backend(&backends, "").unwrap();
        assert_eq!(first.url(), backends[0].url());
        assert_eq!(second.url(), backends[2].url());
    }

    #[test]
    fn all_dead_returns_none() {
        let lb = RoundRobin::new();
        let backends = fleet(2);
        for b in &backends {
            b.set_alive(false);
        }
        assert!(lb.next_backend(&backends, "").is_none());
        assert!(lb.next_backend(&[], "").is_none());
    }

    #[test]
    fn cursor_survives_fleet_shrink() {
        let lb = RoundRobin::new();
        let backends = fleet(3);
        lb.next_backend(&backends, "").unwrap();
        lb.next_backend(&backends, "").unwrap();

        // Shrink the fleet below the cursor position.
        let shrunk = backends[..1].to_vec();
        let picked = lb.next_backend(&shrunk, "").unwrap();
        assert_eq!(picked.url(), shrunk[0].url());
    }
}
