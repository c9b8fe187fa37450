//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via `tracing`, initialized in `main`
//! - Metric updates are fire-and-forget atomic operations; the hot path
//!   never waits on the exporter

pub mod metrics;
