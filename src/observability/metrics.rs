//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sms_send_total` (counter): send requests by outcome
//! - `sms_send_duration_seconds` (histogram): end-to-end failover latency
//! - `sms_provider_attempts_total` (counter): provider attempts by provider, outcome
//! - `sms_circuit_state` (gauge): 0=closed, 1=half-open, 2=open
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::resilience::BreakerState;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a finished send request.
pub fn record_send(outcome: &'static str, start: Instant) {
    counter!("sms_send_total", "outcome" => outcome).increment(1);
    histogram!("sms_send_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record one provider attempt (or skip).
pub fn record_attempt(provider: &str, outcome: &'static str) {
    counter!(
        "sms_provider_attempts_total",
        "provider" => provider.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a breaker's current state.
pub fn record_circuit_state(provider: &str, state: BreakerState) {
    let value = match state {
        BreakerState::Closed => 0.0,
        BreakerState::HalfOpen => 1.0,
        BreakerState::Open => 2.0,
    };
    gauge!("sms_circuit_state", "provider" => provider.to_string()).set(value);
}
