//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Parse CLI → load config → validate → build pool/limiters
//!     → spawn health monitor → serve
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or trigger() → broadcast to subscribers
//!     → server stops accepting, health loop exits
//! ```
//!
//! # Design Decisions
//! - Every long-running task holds its own broadcast receiver; none is an
//!   unbounded loop without an exit path

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
