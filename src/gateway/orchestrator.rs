//! Failover orchestrator.
//!
//! Holds the fixed, priority-ordered list of (breaker, provider) pairs and
//! makes one pass over it per send. Breakers are shared by every concurrent
//! send; each request's walk is sequential.

use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::{ConfigError, GatewayConfig};
use crate::gateway::types::{SendRequest, SendResult};
use crate::observability::metrics;
use crate::providers::{build_provider, ProviderError, ProviderErrorKind, SmsProvider};
use crate::resilience::timeouts::with_timeout;
use crate::resilience::{BreakerState, BreakerStatus, CircuitBreaker, Clock, SystemClock};

/// One provider and the breaker guarding it.
pub struct ProviderSlot {
    breaker: CircuitBreaker,
    provider: Box<dyn SmsProvider>,
}

impl ProviderSlot {
    pub fn new(breaker: CircuitBreaker, provider: Box<dyn SmsProvider>) -> Self {
        Self { breaker, provider }
    }

    pub fn name(&self) -> &str {
        self.provider.name()
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }
}

/// Overall service health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// At least one provider's circuit is not open.
    Healthy,
    /// Every provider's circuit is open.
    Unhealthy,
}

/// Health snapshot across all providers.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub providers: IndexMap<String, BreakerStatus>,
}

/// Routes sends across providers, skipping those whose circuit is open.
pub struct FailoverOrchestrator {
    slots: Vec<ProviderSlot>,
    call_timeout: Duration,
}

impl FailoverOrchestrator {
    /// Create an orchestrator over slots already in failover order.
    pub fn new(slots: Vec<ProviderSlot>, call_timeout: Duration) -> Self {
        tracing::info!(
            providers = ?slots.iter().map(ProviderSlot::name).collect::<Vec<_>>(),
            "Initialized failover orchestrator"
        );
        Self {
            slots,
            call_timeout,
        }
    }

    /// Build adapters and breakers from validated configuration.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    /// Like [`from_config`](Self::from_config) with an injected breaker clock.
    pub fn from_config_with_clock(
        config: &GatewayConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeouts.provider())
            .user_agent(concat!("sms-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut slots = Vec::with_capacity(config.providers.len());
        for provider_config in config.ordered_providers() {
            let provider = build_provider(&provider_config, client.clone())?;
            let breaker = CircuitBreaker::with_clock(
                provider_config.name.clone(),
                config.breaker_settings(&provider_config),
                clock.clone(),
            );
            slots.push(ProviderSlot::new(breaker, provider));
        }

        Ok(Self::new(slots, config.timeouts.provider()))
    }

    /// Send through the first provider that accepts the message.
    ///
    /// Never fails: exhausting the list is reported as an unsuccessful
    /// [`SendResult`] whose `error` lists what happened at each provider.
    pub async fn send(&self, request: &SendRequest) -> SendResult {
        let start = Instant::now();
        let mut outcomes = Vec::with_capacity(self.slots.len());
        let mut last_attempted = None;

        for slot in &self.slots {
            let name = slot.name();

            if !slot.breaker.can_execute() {
                tracing::warn!(provider = %name, "Circuit open, skipping provider");
                metrics::record_attempt(name, "skipped");
                outcomes.push(format!("{}: skipped: circuit open", name));
                continue;
            }

            tracing::info!(provider = %name, "Attempting send");
            last_attempted = Some(name);

            // Bookkeeping below runs synchronously once the call resolves, so
            // dropping this future can only abandon the pending call itself.
            let outcome = with_timeout(self.call_timeout, name, slot.provider.send(request))
                .await
                .and_then(|result| ensure_delivered(name, result));

            match outcome {
                Ok(result) => {
                    slot.breaker.record_success();
                    metrics::record_attempt(name, "success");
                    metrics::record_send("delivered", start);
                    tracing::info!(
                        provider = %name,
                        message_id = result.message_id.as_deref().unwrap_or("-"),
                        "Message sent"
                    );
                    return result;
                }
                Err(err) => {
                    slot.breaker.record_failure();
                    metrics::record_attempt(name, err.kind.as_str());
                    tracing::error!(
                        provider = %name,
                        kind = %err.kind,
                        error = %err.message,
                        "Provider send failed"
                    );
                    outcomes.push(format!("{}: failed: {}: {}", name, err.kind, err.message));
                }
            }
        }

        let error = if outcomes.is_empty() {
            "no providers configured".to_string()
        } else {
            format!("all providers failed: {}", outcomes.join("; "))
        };
        tracing::error!(error = %error, "Message not delivered");
        metrics::record_send("failed", start);
        SendResult::failed(last_attempted.map(str::to_string), error)
    }

    /// Overall health plus each provider's breaker snapshot.
    pub fn health(&self) -> HealthReport {
        let providers = self.circuit_breaker_status();
        let any_available = providers.values().any(|s| s.state != BreakerState::Open);
        HealthReport {
            status: if any_available {
                HealthStatus::Healthy
            } else {
                HealthStatus::Unhealthy
            },
            providers,
        }
    }

    /// Breaker snapshot per provider, in failover order. Never changes
    /// breaker state.
    pub fn circuit_breaker_status(&self) -> IndexMap<String, BreakerStatus> {
        self.slots
            .iter()
            .map(|slot| (slot.name().to_string(), slot.breaker.status()))
            .collect()
    }

    /// Close every circuit and clear its history.
    pub fn reset_circuit_breakers(&self) {
        for slot in &self.slots {
            slot.breaker.reset();
        }
        tracing::info!("Reset circuit breakers for all providers");
    }

    /// Longest a full pass can take: every provider hitting its call timeout.
    pub fn pass_budget(&self) -> Duration {
        self.call_timeout
            .saturating_mul(u32::try_from(self.slots.len()).unwrap_or(u32::MAX))
    }

    /// Provider names in failover order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.slots.iter().map(ProviderSlot::name).collect()
    }

    pub fn slots(&self) -> &[ProviderSlot] {
        &self.slots
    }
}

/// Adapters report failure as an error, but a result flagged unsuccessful
/// is treated the same way.
fn ensure_delivered(provider: &str, result: SendResult) -> Result<SendResult, ProviderError> {
    if result.success {
        Ok(result)
    } else {
        Err(ProviderError::new(
            provider,
            ProviderErrorKind::Rejected,
            result
                .error
                .unwrap_or_else(|| "provider reported failure".to_string()),
        ))
    }
}
