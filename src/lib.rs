//! SMS failover gateway.
//!
//! Sends each message through a priority-ordered list of SMS providers,
//! each guarded by its own circuit breaker, and returns the first success.

pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod providers;
pub mod resilience;

pub use config::GatewayConfig;
pub use gateway::{FailoverOrchestrator, SendRequest, SendResult};
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
