//! Layer-7 HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                LOAD BALANCER                  │
//!                    │                                               │
//!   Client Request   │  ┌─────────┐   ┌───────────┐   ┌──────────┐  │
//!   ─────────────────┼─▶│  http   │──▶│ ratelimit │──▶│ balancer │  │
//!                    │  │ server  │   │ registry  │   │   pool   │  │
//!                    │  └─────────┘   └───────────┘   └────┬─────┘  │
//!                    │                                      │        │
//!                    │          rr / wrr / lc / ip_hash ◀───┘        │
//!                    │                                      │        │
//!   Client Response  │  ┌─────────┐                    ┌────▼─────┐  │
//!   ◀────────────────┼──│ relay   │◀───────────────────│ upstream │◀─┼── Backend
//!                    │  └─────────┘                    │  client  │  │
//!                    │                                 └──────────┘  │
//!                    │  ┌────────────────────────────────────────┐   │
//!                    │  │ health monitor · admin API · lifecycle │   │
//!                    │  └────────────────────────────────────────┘   │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use load_balancer::balancer::pool::ServerPool;
use load_balancer::balancer::StrategyKind;
use load_balancer::config::{self, BalancerConfig, ConfigError};
use load_balancer::health::HealthMonitor;
use load_balancer::http::HttpServer;
use load_balancer::lifecycle::Shutdown;
use load_balancer::observability::metrics;
use load_balancer::ratelimit::registry::LimiterRegistry;
use load_balancer::ratelimit::LimiterKind;

/// Layer-7 HTTP load balancer.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(long)]
    bind: Option<String>,

    /// Override the selection strategy (rr, wrr, lc, ip).
    #[arg(long)]
    strategy: Option<StrategyKind>,

    /// Enable rate limiting with this algorithm (token, leaky, fixed).
    #[arg(long)]
    limiter: Option<LimiterKind>,

    /// Requests per second per client (with --limiter).
    #[arg(long)]
    rate: Option<u32>,

    /// Burst capacity (token and leaky bucket only).
    #[arg(long)]
    burst: Option<u32>,
}

impl Args {
    fn apply(&self, config: &mut BalancerConfig) {
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(limiter) = self.limiter {
            config.rate_limit.enabled = true;
            config.rate_limit.algorithm = limiter;
        }
        if let Some(rate) = self.rate {
            config.rate_limit.rate = rate;
        }
        if let Some(burst) = self.burst {
            config.rate_limit.burst = burst;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "load_balancer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => BalancerConfig::default(),
    };
    args.apply(&mut config);
    config::validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        strategy = %config.strategy,
        backends = config.backends.len(),
        rate_limiting = config.rate_limit.enabled,
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Address validity is part of config validation.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    // Build the pool from the static backend list.
    let pool = Arc::new(ServerPool::new(config.strategy));
    for backend in &config.backends {
        if let Err(e) = pool.add_backend_addr(&backend.address, backend.weight) {
            tracing::warn!(address = %backend.address, error = %e, "skipping invalid backend");
        }
    }

    let limiters = config.rate_limit.enabled.then(|| {
        Arc::new(LimiterRegistry::new(
            config.rate_limit.algorithm,
            config.rate_limit.rate,
            config.rate_limit.burst,
        ))
    });

    let shutdown = Shutdown::new();

    let monitor = HealthMonitor::new(pool.clone(), config.health_check.clone());
    let monitor_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        monitor.run(monitor_shutdown).await;
    });

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(&config, pool, limiters);
    server.run(listener, shutdown.subscribe()).await?;

    // The serve loop is done; stop the health monitor too.
    shutdown.trigger();

    tracing::info!("shutdown complete");
    Ok(())
}
