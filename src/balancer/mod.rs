//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Request admitted by the rate limiter
//!     → pool.rs (coarse lock around fleet membership + active strategy)
//!     → Apply the selection algorithm:
//!         - round_robin.rs (rotate through alive backends)
//!         - weighted.rs (smooth weighted round robin)
//!         - least_conn.rs (fewest in-flight requests)
//!         - ip_hash.rs (sticky mapping from client IP)
//!     → backend.rs (lease with RAII connection release)
//!     → Return lease or none (no alive backend)
//! ```
//!
//! # Design Decisions
//! - Strategies receive the fleet slice on every call instead of holding a
//!   private copy, so membership changes can never leave a stale view
//! - Dead backends are excluded inside each algorithm
//! - Only Least Connections tracks in-flight requests; its leases are the
//!   only counted ones

pub mod backend;
pub mod ip_hash;
pub mod least_conn;
pub mod pool;
pub mod round_robin;
pub mod weighted;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use self::backend::Backend;
use self::ip_hash::IpHash;
use self::least_conn::LeastConnections;
use self::round_robin::RoundRobin;
use self::weighted::WeightedRoundRobin;

/// A backend selection algorithm.
///
/// `next_backend` must be safe to call from many requests concurrently;
/// each implementation guards its own per-call state. `client_ip` is only
/// consulted by IP-hash.
pub trait Strategy: Send + Sync {
    /// Which algorithm this is.
    fn kind(&self) -> StrategyKind;

    /// Select a backend from the fleet, or `None` when no alive backend
    /// can serve the request.
    fn next_backend(&self, backends: &[Arc<Backend>], client_ip: &str) -> Option<Arc<Backend>>;
}

/// The closed set of selection algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    RoundRobin,
    WeightedRoundRobin,
    LeastConnections,
    IpHash,
}

impl StrategyKind {
    /// Instantiate the algorithm for this kind.
    pub fn build(self) -> Box<dyn Strategy> {
        match self {
            StrategyKind::RoundRobin => Box::new(RoundRobin::new()),
            StrategyKind::WeightedRoundRobin => Box::new(WeightedRoundRobin::new()),
            StrategyKind::LeastConnections => Box::new(LeastConnections::new()),
            StrategyKind::IpHash => Box::new(IpHash::new()),
        }
    }

    /// Whether selections under this kind hold a connection credit that
    /// must be released on completion.
    pub fn tracks_connections(self) -> bool {
        matches!(self, StrategyKind::LeastConnections)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::RoundRobin => "round_robin",
            StrategyKind::WeightedRoundRobin => "weighted_round_robin",
            StrategyKind::LeastConnections => "least_connections",
            StrategyKind::IpHash => "ip_hash",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized strategy tag. Fatal at configuration time.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown strategy '{0}': use round_robin (rr), weighted_round_robin (wrr), least_connections (lc) or ip_hash (ip)")]
pub struct UnknownStrategy(pub String);

impl FromStr for StrategyKind {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round_robin" | "rr" => Ok(StrategyKind::RoundRobin),
            "weighted_round_robin" | "wrr" => Ok(StrategyKind::WeightedRoundRobin),
            "least_connections" | "lc" => Ok(StrategyKind::LeastConnections),
            "ip_hash" | "ip" => Ok(StrategyKind::IpHash),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}
