//! Layer-7 HTTP load balancer library.

// Traffic management
pub mod balancer;
pub mod health;
pub mod ratelimit;

// Dispatch boundary
pub mod admin;
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use balancer::pool::ServerPool;
pub use balancer::StrategyKind;
pub use config::BalancerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use ratelimit::registry::LimiterRegistry;
pub use ratelimit::LimiterKind;
