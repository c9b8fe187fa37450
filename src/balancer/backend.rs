//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream server
//! - Track liveness (written by the health monitor)
//! - Track active connections (for Least Connections LB)
//! - Carry the smooth-WRR scheduling credit
//!
//! # Design Decisions
//! - Each mutable field is its own atomic: a liveness reader never waits
//!   on a connection-count writer and vice versa
//! - Connection release floors at zero, so a stray release under a
//!   non-tracking strategy is a harmless no-op

use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

/// A single backend server.
#[derive(Debug)]
pub struct Backend {
    /// Upstream base URL, immutable after registration.
    url: Url,
    /// Pre-rendered `host:port` for request URI rewriting.
    authority: String,
    /// Static capacity hint, >= 1, immutable.
    weight: u32,
    /// Last known health status.
    alive: AtomicBool,
    /// Smooth weighted-round-robin credit. Only the WRR strategy writes
    /// this, inside its own critical section.
    current_weight: AtomicI64,
    /// In-flight requests dispatched by Least Connections.
    active_connections: AtomicUsize,
}

impl Backend {
    /// Create a new backend. Weights below 1 are clamped to 1.
    pub fn new(url: Url, weight: u32) -> Self {
        let authority = match (url.host_str(), url.port_or_known_default()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            _ => url.as_str().to_string(),
        };
        Self {
            url,
            authority,
            weight: weight.max(1),
            alive: AtomicBool::new(true),
            current_weight: AtomicI64::new(0),
            active_connections: AtomicUsize::new(0),
        }
    }

    /// Upstream base URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `host:port` authority for URI rewriting.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Static scheduling weight.
    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Last known health status.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Overwrite the health status (last write wins).
    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Relaxed);
    }

    /// Current WRR credit.
    pub fn current_weight(&self) -> i64 {
        self.current_weight.load(Ordering::Relaxed)
    }

    /// Overwrite the WRR credit. Callers must hold the WRR scan lock.
    pub fn set_current_weight(&self, credit: i64) {
        self.current_weight.store(credit, Ordering::Relaxed);
    }

    /// Number of in-flight requests.
    pub fn connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Count one more in-flight request.
    pub fn acquire_connection(&self) {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one request as complete. No-op when already at zero.
    pub fn release_connection(&self) {
        let _ = self
            .active_connections
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }
}

/// A selected backend, handed to the dispatch boundary.
///
/// When minted by a connection-tracking strategy the lease releases the
/// connection credit exactly once on drop; otherwise dropping it does
/// nothing to the counters.
#[derive(Debug)]
pub struct BackendLease {
    backend: Arc<Backend>,
    counted: bool,
}

impl BackendLease {
    pub(crate) fn new(backend: Arc<Backend>, counted: bool) -> Self {
        Self { backend, counted }
    }

    /// The leased backend.
    pub fn backend(&self) -> &Arc<Backend> {
        &self.backend
    }
}

impl Deref for BackendLease {
    type Target = Backend;

    fn deref(&self) -> &Self::Target {
        &self.backend
    }
}

impl Drop for BackendLease {
    fn drop(&mut self) {
        if self.counted {
            self.backend.release_connection();
        }
    }
}
