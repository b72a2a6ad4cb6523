//! Timeout enforcement for provider calls.
//!
//! Every outbound send has a deadline. An elapsed deadline is reported as a
//! `network` failure for that provider, which the orchestrator treats like
//! any other failed attempt.

use std::future::Future;
use std::time::Duration;

use crate::providers::{ProviderError, ProviderErrorKind};

/// Run `fut`, converting an elapsed deadline into a provider network error.
pub async fn with_timeout<T, F>(limit: Duration, provider: &str, fut: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::new(
            provider,
            ProviderErrorKind::Network,
            format!("timed out after {} ms", limit.as_millis()),
        )),
    }
}
