//! Runtime administration API.
//!
//! # Responsibilities
//! - Inspect the fleet (liveness, weights, in-flight counts)
//! - Add and remove backends while traffic flows
//! - Swap the selection strategy without discarding membership
//!
//! # Design Decisions
//! - Mounted under `/admin` on the main listener; explicit routes win over
//!   the proxy catch-all
//! - Structural mutations go straight to the pool, which serializes them
//!   against in-flight selections

pub mod handlers;

use axum::routing::get;
use axum::Router;

use crate::http::server::AppState;

use self::handlers::*;

/// Build the admin sub-router. State is supplied by the caller when the
/// full application router is assembled.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/backends",
            get(list_backends).post(add_backend).delete(remove_backend),
        )
        .route("/admin/strategy", get(get_strategy).put(set_strategy))
        .route("/admin/status", get(get_status))
}
