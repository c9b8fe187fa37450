//! Smooth weighted round-robin load balancing strategy.

use std::sync::{Arc, Mutex};

use crate::balancer::backend::Backend;
use crate::balancer::{Strategy, StrategyKind};

/// Smooth weighted round-robin selector.
///
/// Every call credits each alive backend with its static weight, then the
/// backend holding the largest credit wins and is discharged by the total
/// credited this round. Selection frequency converges to
/// `weight / sum(weights)` without bursting the heaviest backend.
///
/// The credit ledger lives on the backends (`current_weight`); the scan
/// holds this strategy's lock so the whole credit update is atomic.
#[derive(Debug, Default)]
pub struct WeightedRoundRobin {
    scan: Mutex<()>,
}

impl WeightedRoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for WeightedRoundRobin {
    fn kind(&self) -> StrategyKind {
        StrategyKind::WeightedRoundRobin
    }

    fn next_backend(&self, backends: &[Arc<Backend>], _client_ip: &str) -> Option<Arc<Backend>> {
        let _guard = self.scan.lock().expect("weighted round robin scan poisoned");

        let mut total_weight: i64 = 0;
        let mut best: Option<(&Arc<Backend>, i64)> = None;

        for b in backends.iter().filter(|b| b.is_alive()) {
            let credit = b.current_weight() + i64::from(b.weight());
            b.set_current_weight(credit);
            total_weight += i64::from(b.weight());

            // Strictly-greater keeps the first maximum on ties.
            match best {
                Some((_, best_credit)) if credit <= best_credit => {}
                _ => best = Some((b, credit)),
            }
        }

        let (winner, credit) = best?;
        winner.set_current_weight(credit - total_weight);
        Some(winner.clone())
    }
}
