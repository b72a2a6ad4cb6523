//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! TOML file (--config) or environment (.env via dotenvy)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable for the process lifetime)
//! ```
//!
//! The provider list and its failover order are fixed at startup; there is
//! no hot reload.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{from_env, load, load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, CircuitBreakerConfig, GatewayConfig, ObservabilityConfig, ProviderConfig,
    ServerConfig, TimeoutConfig,
};
pub use validation::ValidationError;
