//! Server pool: fleet membership plus the active strategy.
//!
//! # Responsibilities
//! - Own the ordered backend list (order matters to round robin and the
//!   ip-hash index)
//! - Serialize structural mutation (add/remove, strategy swap) against
//!   selection
//! - Mint leases so least-connections credits are released exactly once
//!
//! # Design Decisions
//! - One RwLock over membership + strategy: add/remove take the write
//!   lock, selection takes the read lock, so a strategy mid-scan can never
//!   observe a half-applied membership change
//! - Strategies are handed the fleet slice per call and hold no copy, so
//!   there is no separate resynchronization step to forget

use std::sync::{Arc, RwLock};

use url::Url;

use crate::balancer::backend::{Backend, BackendLease};
use crate::balancer::{Strategy, StrategyKind};

/// Pool operation errors.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Removal target is not in the pool. Pool state is unchanged.
    #[error("backend {0} not found")]
    BackendNotFound(String),

    /// Address did not parse as a URL.
    #[error("invalid backend address {address}: {source}")]
    InvalidAddress {
        address: String,
        source: url::ParseError,
    },
}

struct PoolState {
    backends: Vec<Arc<Backend>>,
    strategy: Box<dyn Strategy>,
}

/// The authoritative backend registry.
pub struct ServerPool {
    state: RwLock<PoolState>,
}

impl ServerPool {
    /// Create an empty pool running the given strategy.
    pub fn new(kind: StrategyKind) -> Self {
        Self {
            state: RwLock::new(PoolState {
                backends: Vec::new(),
                strategy: kind.build(),
            }),
        }
    }

    /// Register a backend. New backends start alive; the health monitor
    /// corrects that within one probe interval.
    pub fn add_backend(&self, url: Url, weight: u32) -> Arc<Backend> {
        let backend = Arc::new(Backend::new(url, weight));
        let mut state = self.state.write().expect("server pool lock poisoned");
        state.backends.push(backend.clone());
        tracing::info!(backend = %backend.url(), weight = backend.weight(), "backend added");
        backend
    }

    /// Parse and register a backend address.
    pub fn add_backend_addr(&self, address: &str, weight: u32) -> Result<Arc<Backend>, PoolError> {
        let url = Url::parse(address).map_err(|source| PoolError::InvalidAddress {
            address: address.to_string(),
            source,
        })?;
        Ok(self.add_backend(url, weight))
    }

    /// Remove a backend by address. The pool is left untouched when the
    /// address is unknown.
    pub fn remove_backend(&self, address: &str) -> Result<(), PoolError> {
        let mut state = self.state.write().expect("server pool lock poisoned");
        // Parse the address so the comparison survives Url normalization
        // (trailing slash, default port); bare `host:port` input falls back
        // to the authority match.
        let target = Url::parse(address).ok();
        let position = state
            .backends
            .iter()
            .position(|b| target.as_ref() == Some(b.url()) || b.authority() == address);
        match position {
            Some(index) => {
                let removed = state.backends.remove(index);
                // Anything still routing to it should stop on the next probe
                // or selection; mark it dead for observers holding the Arc.
                removed.set_alive(false);
                tracing::info!(backend = %removed.url(), "backend removed");
                Ok(())
            }
            None => Err(PoolError::BackendNotFound(address.to_string())),
        }
    }

    /// Snapshot of the current fleet, for the health monitor and admin API.
    pub fn backends(&self) -> Vec<Arc<Backend>> {
        self.state
            .read()
            .expect("server pool lock poisoned")
            .backends
            .clone()
    }

    /// Number of registered backends.
    pub fn backend_count(&self) -> usize {
        self.state
            .read()
            .expect("server pool lock poisoned")
            .backends
            .len()
    }

    /// Ask the active strategy for a backend.
    ///
    /// The returned lease is counted (releases a connection credit on
    /// drop) only when the active strategy tracks connections.
    pub fn select(&self, client_ip: &str) -> Option<BackendLease> {
        let state = self.state.read().expect("server pool lock poisoned");
        let backend = state.strategy.next_backend(&state.backends, client_ip)?;
        let counted = state.strategy.kind().tracks_connections();
        Some(BackendLease::new(backend, counted))
    }

    /// Swap the selection algorithm without touching fleet membership.
    pub fn set_strategy(&self, kind: StrategyKind) {
        let mut state = self.state.write().expect("server pool lock poisoned");
        if state.strategy.kind() == kind {
            return;
        }
        tracing::info!(from = %state.strategy.kind(), to = %kind, "strategy swapped");
        if kind == StrategyKind::WeightedRoundRobin {
            // A fresh weighted instance starts from a clean credit ledger,
            // not whatever a previous instance left on the backends.
            for b in &state.backends {
                b.set_current_weight(0);
            }
        }
        state.strategy = kind.build();
    }

    /// The currently active algorithm.
    pub fn strategy_kind(&self) -> StrategyKind {
        self.state
            .read()
            .expect("server pool lock poisoned")
            .strategy
            .kind()
    }
}
