//! HTTP dispatch boundary.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, trace layers)
//!     → client_ip.rs (resolve client identity)
//!     → rate limiter (admit or 429)
//!     → server pool (select backend or 503)
//!     → rewrite scheme/authority, forward via shared hyper client
//!     → relay upstream response (502 on transport failure)
//! ```

pub mod client_ip;
pub mod request;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
