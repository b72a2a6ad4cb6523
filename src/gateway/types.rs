//! Request and result types flowing through the gateway.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static RECIPIENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").expect("recipient pattern is valid"));

/// Rejected send input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("recipient must be a phone number in international format, got '{0}'")]
    InvalidRecipient(String),

    #[error("message must not be empty")]
    EmptyMessage,
}

/// A single outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    /// Destination phone number, optionally `+`-prefixed.
    pub recipient: String,
    /// Message body.
    pub message: String,
}

impl SendRequest {
    pub fn new(recipient: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            message: message.into(),
        }
    }

    /// Check the request is deliverable before any provider sees it.
    pub fn validate(&self) -> Result<(), RequestError> {
        if !RECIPIENT_PATTERN.is_match(&self.recipient) {
            return Err(RequestError::InvalidRecipient(self.recipient.clone()));
        }
        if self.message.trim().is_empty() {
            return Err(RequestError::EmptyMessage);
        }
        Ok(())
    }
}

/// Outcome of a send, either from one provider or from the whole failover pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResult {
    pub success: bool,

    /// Provider-assigned identifier. Only set on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    /// Provider that produced this result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    pub timestamp: DateTime<Utc>,

    /// Human-readable failure reason. Only set on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendResult {
    pub fn delivered(provider: impl Into<String>, message_id: Option<String>) -> Self {
        Self {
            success: true,
            message_id,
            provider: Some(provider.into()),
            timestamp: Utc::now(),
            error: None,
        }
    }

    pub fn failed(provider: Option<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            provider,
            timestamp: Utc::now(),
            error: Some(error.into()),
        }
    }
}
