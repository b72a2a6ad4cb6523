//! Failover gateway.
//!
//! # Data Flow
//! ```text
//! SendRequest
//!     → orchestrator.rs (walk providers in priority order)
//!         → breaker.can_execute()? skip : provider.send()
//!         → breaker.record_success() / record_failure()
//!     → first success, or one aggregated failure SendResult
//! ```

pub mod orchestrator;
pub mod types;

pub use orchestrator::{FailoverOrchestrator, HealthReport, HealthStatus, ProviderSlot};
pub use types::{RequestError, SendRequest, SendResult};
