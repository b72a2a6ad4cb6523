//! Mnotify adapter.
//!
//! `POST {base}/api/sms/quick?key=<api_key>`; the credential travels in the
//! query string, so it must never reach logs or error messages.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{ConfigError, ProviderConfig};
use crate::gateway::{SendRequest, SendResult};
use crate::providers::response::{
    id_string, is_success_status, message_text, read_response, transport_error,
};
use crate::providers::{endpoint_url, ProviderError, ProviderErrorKind, SmsProvider};

const SEND_PATH: &str = "/api/sms/quick";

#[derive(Debug, Serialize)]
struct Payload<'a> {
    to: &'a str,
    message: &'a str,
    sender: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct Reply {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    summary: Option<Summary>,
}

#[derive(Debug, Deserialize)]
struct Summary {
    #[serde(default, rename = "_id")]
    id: Option<serde_json::Value>,
}

pub struct MnotifyProvider {
    name: String,
    endpoint: Url,
    api_key: String,
    sender_id: String,
    client: reqwest::Client,
}

impl MnotifyProvider {
    pub fn new(config: &ProviderConfig, client: reqwest::Client) -> Result<Self, ConfigError> {
        Ok(Self {
            name: config.name.clone(),
            endpoint: endpoint_url(config, SEND_PATH)?,
            api_key: config.api_key.clone(),
            sender_id: config.sender_id.clone(),
            client,
        })
    }
}

#[async_trait]
impl SmsProvider for MnotifyProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, request: &SendRequest) -> Result<SendResult, ProviderError> {
        let payload = Payload {
            to: &request.recipient,
            message: &request.message,
            sender: &self.sender_id,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error(&self.name, e))?;

        let reply: Reply = read_response(&self.name, response).await?;
        interpret(&self.name, reply)
    }
}

fn interpret(provider: &str, reply: Reply) -> Result<SendResult, ProviderError> {
    if !is_success_status(reply.status.as_deref()) {
        let reason = reply
            .message
            .as_ref()
            .and_then(message_text)
            .unwrap_or_else(|| "unknown Mnotify API error".to_string());
        return Err(ProviderError::new(provider, ProviderErrorKind::Rejected, reason));
    }

    let message_id = reply
        .summary
        .and_then(|s| s.id)
        .as_ref()
        .and_then(id_string);
    if message_id.is_none() {
        tracing::warn!(provider = %provider, "Message accepted without an identifier");
    }

    Ok(SendResult::delivered(provider, message_id))
}

impl fmt::Debug for MnotifyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MnotifyProvider")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint.as_str())
            .field("sender_id", &self.sender_id)
            .finish_non_exhaustive()
    }
}
