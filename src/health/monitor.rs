//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every backend currently in the pool
//! - Flip each backend's liveness flag from the probe outcome

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::sync::broadcast;
use tokio::time;

use crate::balancer::pool::ServerPool;
use crate::config::HealthCheckConfig;
use crate::observability::metrics;

pub struct HealthMonitor {
    pool: Arc<ServerPool>,
    config: HealthCheckConfig,
    client: Client<HttpConnector, Body>,
}

impl HealthMonitor {
    pub fn new(pool: Arc<ServerPool>, config: HealthCheckConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            pool,
            config,
            client,
        }
    }

    /// Run the probe loop until the shutdown signal fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("health checks disabled");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            path = %self.config.path,
            "health monitor starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    async fn check_all(&self) {
        // Snapshot first; the pool lock is never held across a probe.
        for backend in self.pool.backends() {
            let alive = self.probe(backend.url().as_str()).await;

            if alive != backend.is_alive() {
                if alive {
                    tracing::info!(backend = %backend.url(), "backend recovered");
                } else {
                    tracing::warn!(backend = %backend.url(), "backend marked dead");
                }
            }
            backend.set_alive(alive);
            metrics::record_backend_health(backend.url().as_str(), alive);
        }
    }

    async fn probe(&self, base_url: &str) -> bool {
        let uri_string = format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            self.config.path
        );

        let request = match Request::builder()
            .method("GET")
            .uri(uri_string)
            .header("user-agent", "load-balancer-health-check")
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(backend = %base_url, error = %e, "failed to build health probe");
                return false;
            }
        };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        match time::timeout(timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let success = response.status().is_success();
                if !success {
                    tracing::warn!(
                        backend = %base_url,
                        status = %response.status(),
                        "health probe failed: non-success status"
                    );
                }
                success
            }
            Ok(Err(e)) => {
                tracing::warn!(backend = %base_url, error = %e, "health probe failed: connection error");
                false
            }
            Err(_) => {
                tracing::warn!(backend = %base_url, "health probe failed: timeout");
                false
            }
        }
    }
}
