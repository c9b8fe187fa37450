//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides applied in main
//!     → validation.rs (semantic checks, all errors collected)
//!     → BalancerConfig (validated, immutable)
//!     → shared by value/Arc with all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; runtime fleet changes go through the
//!   admin API, not the config
//! - All fields have defaults to allow minimal configs
//! - Unknown strategy/limiter tags are rejected at parse time

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BackendConfig, BalancerConfig, HealthCheckConfig, ListenerConfig, ObservabilityConfig,
    RateLimitConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
