//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (weights, rates, intervals)
//! - Check addresses actually parse before the system accepts them
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs after CLI overrides, before any subsystem is constructed

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::BalancerConfig;
use crate::ratelimit::LimiterKind;

/// A single semantic problem with the configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("backend address '{0}' is not a valid http URL")]
    InvalidBackendAddress(String),

    #[error("backend '{0}' has weight 0; weights must be >= 1")]
    ZeroWeight(String),

    #[error("rate_limit.rate must be >= 1 when rate limiting is enabled")]
    ZeroRate,

    #[error("rate_limit.burst must be >= 1 for {0}")]
    ZeroBurst(LimiterKind),

    #[error("health_check.interval_secs must be >= 1 when health checking is enabled")]
    ZeroInterval,

    #[error("health_check.timeout_secs must be >= 1 when health checking is enabled")]
    ZeroProbeTimeout,

    #[error("observability.metrics_address '{0}' is not a valid socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    for backend in &config.backends {
        match Url::parse(&backend.address) {
            Ok(url) if url.scheme() == "http" && url.host_str().is_some() => {}
            _ => errors.push(ValidationError::InvalidBackendAddress(
                backend.address.clone(),
            )),
        }
        if backend.weight == 0 {
            errors.push(ValidationError::ZeroWeight(backend.address.clone()));
        }
    }

    if config.rate_limit.enabled {
        if config.rate_limit.rate == 0 {
            errors.push(ValidationError::ZeroRate);
        }
        let needs_burst = matches!(
            config.rate_limit.algorithm,
            LimiterKind::TokenBucket | LimiterKind::LeakyBucket
        );
        if needs_burst && config.rate_limit.burst == 0 {
            errors.push(ValidationError::ZeroBurst(config.rate_limit.algorithm));
        }
    }

    if config.health_check.enabled {
        if config.health_check.interval_secs == 0 {
            errors.push(ValidationError::ZeroInterval);
        }
        if config.health_check.timeout_secs == 0 {
            errors.push(ValidationError::ZeroProbeTimeout);
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
