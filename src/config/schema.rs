//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML. Everything
//! except the provider list has a default.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::providers::ProviderKind;
use crate::resilience::BreakerSettings;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,

    /// Breaker thresholds shared by every provider unless overridden.
    pub circuit_breaker: CircuitBreakerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Operator endpoint protection.
    pub admin: AdminConfig,

    /// Providers in declaration order. Failover order is by `priority`.
    pub providers: Vec<ProviderConfig>,
}

impl GatewayConfig {
    /// Providers in failover order: ascending priority, ties keep
    /// declaration order.
    pub fn ordered_providers(&self) -> Vec<ProviderConfig> {
        let mut providers = self.providers.clone();
        providers.sort_by_key(|p| p.priority);
        providers
    }

    /// Breaker thresholds for a provider, applying its overrides.
    pub fn breaker_settings(&self, provider: &ProviderConfig) -> BreakerSettings {
        BreakerSettings::new(
            provider
                .failure_threshold
                .unwrap_or(self.circuit_breaker.failure_threshold),
            Duration::from_secs(
                provider
                    .reset_timeout_secs
                    .unwrap_or(self.circuit_breaker.reset_timeout_secs),
            ),
        )
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Global circuit breaker thresholds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures tolerated before a provider's circuit opens.
    pub failure_threshold: u32,

    /// Seconds an open circuit waits before allowing a trial send.
    pub reset_timeout_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout_secs: 30,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole inbound request deadline in seconds.
    pub request_secs: u64,

    /// Deadline for a single provider call in seconds.
    pub provider_secs: u64,
}

impl TimeoutConfig {
    pub fn provider(&self) -> Duration {
        Duration::from_secs(self.provider_secs)
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            provider_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Prometheus endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Operator endpoint configuration.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token required by the reset endpoint. Open when unset.
    pub api_key: Option<String>,
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A single messaging provider.
#[derive(Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Unique identifier, reported in results and metrics.
    pub name: String,

    /// Which adapter speaks to this provider.
    pub kind: ProviderKind,

    /// API base URL, e.g. "https://sms.arkesel.com".
    pub base_url: String,

    /// API credential.
    pub api_key: String,

    /// Sender id shown to recipients.
    pub sender_id: String,

    /// Failover position (lower = tried first).
    #[serde(default)]
    pub priority: u32,

    /// Override of the global failure threshold.
    #[serde(default)]
    pub failure_threshold: Option<u32>,

    /// Override of the global reset timeout.
    #[serde(default)]
    pub reset_timeout_secs: Option<u64>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("sender_id", &self.sender_id)
            .field("priority", &self.priority)
            .field("failure_threshold", &self.failure_threshold)
            .field("reset_timeout_secs", &self.reset_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(name: &str, priority: u32) -> ProviderConfig {
        ProviderConfig {
            name: name.into(),
            kind: ProviderKind::Arkesel,
            base_url: "https://sms.arkesel.com".into(),
            api_key: "secret".into(),
            sender_id: "ACME".into(),
            priority,
            failure_threshold: None,
            reset_timeout_secs: None,
        }
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.circuit_breaker.failure_threshold, 5);
        assert_eq!(config.circuit_breaker.reset_timeout_secs, 30);
        assert_eq!(config.timeouts.provider_secs, 10);
        assert!(config.admin.api_key.is_none());
        assert!(config.providers.is_empty());
    }

    #[test]
    fn test_ordered_providers_is_stable() {
        let config = GatewayConfig {
            providers: vec![provider("c", 2), provider("a", 1), provider("b", 1)],
            ..Default::default()
        };
        let names: Vec<_> = config.ordered_providers().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_breaker_overrides() {
        let mut config = GatewayConfig::default();
        let mut p = provider("a", 0);
        assert_eq!(config.breaker_settings(&p), BreakerSettings::new(5, Duration::from_secs(30)));

        p.failure_threshold = Some(2);
        p.reset_timeout_secs = Some(5);
        config.circuit_breaker.failure_threshold = 9;
        assert_eq!(config.breaker_settings(&p), BreakerSettings::new(2, Duration::from_secs(5)));
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let debug = format!("{:?}", provider("a", 0));
        assert!(!debug.contains("secret"));

        let admin = AdminConfig { api_key: Some("hunter2".into()) };
        assert!(!format!("{:?}", admin).contains("hunter2"));
    }
}
