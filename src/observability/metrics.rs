//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lb_requests_total` (counter): requests by method, status, backend
//! - `lb_request_duration_seconds` (histogram): end-to-end latency
//! - `lb_rate_limited_total` (counter): admissions denied, by algorithm
//! - `lb_backend_health` (gauge): 1=alive, 0=dead, per backend

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener. Failures are
/// logged, never fatal: the balancer runs fine without a scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "failed to start metrics endpoint"),
    }
}

/// Record one proxied (or refused) request.
pub fn record_request(method: &str, status: u16, backend: &str, start: Instant) {
    counter!(
        "lb_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "backend" => backend.to_string()
    )
    .increment(1);
    histogram!("lb_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record one admission denial.
pub fn record_rate_limited(algorithm: &str) {
    counter!("lb_rate_limited_total", "algorithm" => algorithm.to_string()).increment(1);
}

/// Record a backend's probed health.
pub fn record_backend_health(backend: &str, alive: bool) {
    gauge!("lb_backend_health", "backend" => backend.to_string())
        .set(if alive { 1.0 } else { 0.0 });
}
