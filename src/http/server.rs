//! HTTP server setup and the proxy handler.
//!
//! # Responsibilities
//! - Create the Axum router (admin API + catch-all proxy handler)
//! - Wire up middleware (trace, timeout, request ID)
//! - Resolve client identity, run admission control, select a backend
//! - Forward requests to the chosen upstream and relay the response

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::uri::{Authority, PathAndQuery, Scheme},
    http::{Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::balancer::pool::ServerPool;
use crate::config::BalancerConfig;
use crate::http::client_ip::client_ip;
use crate::http::request::MakeRequestUuid;
use crate::http::X_REQUEST_ID;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;
use crate::ratelimit::registry::LimiterRegistry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<ServerPool>,
    pub limiters: Option<Arc<LimiterRegistry>>,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server for the load balancer.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over an already-populated pool.
    pub fn new(
        config: &BalancerConfig,
        pool: Arc<ServerPool>,
        limiters: Option<Arc<LimiterRegistry>>,
    ) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            pool,
            limiters,
            client,
        };

        let router = Router::new()
            .merge(admin::admin_router())
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http());

        Self { router }
    }

    /// Run the server until Ctrl+C or the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => {}
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler: admission, selection, forward.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().to_string();
    let client = client_ip(request.headers(), peer);

    // 1. Admission
    if let Some(limiters) = &state.limiters {
        if !limiters.allow(&client) {
            tracing::warn!(request_id = %request_id, client = %client, "rate limit exceeded");
            metrics::record_rate_limited(limiters.kind().as_str());
            return (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded").into_response();
        }
    }

    // 2. Selection. The lease lives to the end of this handler; dropping
    // it releases the least-connections credit exactly once.
    let lease = match state.pool.select(&client) {
        Some(lease) => lease,
        None => {
            tracing::warn!(request_id = %request_id, "no alive backends");
            metrics::record_request(&method, 503, "none", start_time);
            return (StatusCode::SERVICE_UNAVAILABLE, "No alive backends").into_response();
        }
    };

    let backend = lease.authority().to_string();
    tracing::debug!(
        request_id = %request_id,
        client = %client,
        backend = %lease.url(),
        "forwarding request"
    );

    // 3. URI rewrite: swap scheme/authority, keep path and query.
    let (mut parts, body) = request.into_parts();
    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = match Authority::from_str(&backend) {
        Ok(authority) => Some(authority),
        Err(e) => {
            tracing::error!(request_id = %request_id, backend = %backend, error = %e, "bad backend authority");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "failed to build upstream uri");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    // 4. Forward
    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let status = response.status();
            metrics::record_request(&method, status.as_u16(), &backend, start_time);
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body)).into_response()
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                backend = %backend,
                error = %e,
                "upstream request failed"
            );
            metrics::record_request(&method, 502, &backend, start_time);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
