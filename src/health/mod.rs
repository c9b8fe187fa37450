//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! monitor.rs:
//!     Periodic timer (or shutdown signal)
//!     → GET <backend>/health with a bounded timeout
//!     → Backend::set_alive(result) — last write wins
//!     → Every strategy observes the flag on its next selection
//! ```
//!
//! # Design Decisions
//! - A single probe decides: success status means alive, anything else
//!   (non-success, connect error, timeout) means dead
//! - Probes run outside any pool lock; only the flag write touches shared
//!   state
//! - Eventually consistent: a backend can keep receiving traffic for up to
//!   one interval after it actually failed

pub mod monitor;

pub use monitor::HealthMonitor;
