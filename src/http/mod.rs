//! HTTP host service.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, request id, tracing, timeout, body limit)
//!     → auth.rs (operator routes only)
//!     → handlers.rs (decode, validate, call the gateway)
//!     → response.rs (error rendering)
//! ```

pub mod auth;
pub mod handlers;
pub mod response;
pub mod server;

pub use server::{AppState, GatewayServer};
