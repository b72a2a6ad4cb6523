//! Messaging provider adapters.
//!
//! # Data Flow
//! ```text
//! SendRequest
//!     → SmsProvider::send (provider-specific auth, endpoint, payload)
//!     → response.rs (status + body classification)
//!     → SendResult or ProviderError{network|auth|rejected|malformed_response}
//! ```
//!
//! The set of providers is closed: each [`ProviderKind`] has one adapter
//! type, and [`build_provider`] is the only place a configured entry turns
//! into a live adapter. Adding a provider means adding a variant and an
//! adapter implementing [`SmsProvider`].

pub mod arkesel;
#[cfg(test)]
pub(crate) mod fake;
pub mod mnotify;
pub mod response;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use url::Url;

use crate::config::{ConfigError, ProviderConfig};
use crate::gateway::{SendRequest, SendResult};

pub use arkesel::ArkeselProvider;
pub use mnotify::MnotifyProvider;

/// Known provider implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Arkesel,
    Mnotify,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Arkesel => "arkesel",
            ProviderKind::Mnotify => "mnotify",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a provider call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// Connection failure, timeout, or upstream unavailability.
    Network,
    /// Credentials refused.
    Auth,
    /// The provider understood the request and declined it.
    Rejected,
    /// The provider answered with something we could not interpret.
    MalformedResponse,
}

impl ProviderErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderErrorKind::Network => "network",
            ProviderErrorKind::Auth => "auth",
            ProviderErrorKind::Rejected => "rejected",
            ProviderErrorKind::MalformedResponse => "malformed_response",
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed attempt against one provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{provider}: {kind}: {message}")]
pub struct ProviderError {
    pub provider: String,
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: impl Into<String>, kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            kind,
            message: message.into(),
        }
    }
}

/// Capability shared by every provider adapter.
///
/// Adapters are stateless beyond their configuration; breaker bookkeeping
/// belongs to the orchestrator.
#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// Identifier used in results, logs, and metrics.
    fn name(&self) -> &str;

    /// Deliver one message using this provider's configured sender id.
    async fn send(&self, request: &SendRequest) -> Result<SendResult, ProviderError>;
}

/// Build the adapter for a configured provider.
pub fn build_provider(
    config: &ProviderConfig,
    client: reqwest::Client,
) -> Result<Box<dyn SmsProvider>, ConfigError> {
    let provider: Box<dyn SmsProvider> = match config.kind {
        ProviderKind::Arkesel => Box::new(ArkeselProvider::new(config, client)?),
        ProviderKind::Mnotify => Box::new(MnotifyProvider::new(config, client)?),
    };
    Ok(provider)
}

/// Join a provider's base URL with an API path.
///
/// Base URLs may carry a path prefix, so the path is appended rather than
/// resolved against the base.
pub(crate) fn endpoint_url(config: &ProviderConfig, path: &str) -> Result<Url, ConfigError> {
    let raw = format!("{}{}", config.base_url.trim_end_matches('/'), path);
    Url::parse(&raw).map_err(|source| ConfigError::Endpoint {
        provider: config.name.clone(),
        source,
    })
}
