//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Send attempt against a provider:
//!     → circuit_breaker.rs (may this provider be called right now?)
//!     → timeouts.rs (bound the outbound call)
//!     → circuit_breaker.rs (record success or failure)
//! ```
//!
//! Breakers read time through clock.rs so cooldowns can be simulated.

pub mod circuit_breaker;
pub mod clock;
pub mod timeouts;

pub use circuit_breaker::{BreakerSettings, BreakerState, BreakerStatus, CircuitBreaker};
pub use clock::{Clock, ManualClock, SystemClock};
