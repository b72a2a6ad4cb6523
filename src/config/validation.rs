//! Configuration validation.
//!
//! Semantic checks only; serde handles syntax. Every problem is reported,
//! not just the first.

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no providers configured")]
    NoProviders,

    #[error("duplicate provider name '{0}'")]
    DuplicateProvider(String),

    #[error("provider '{provider}': {field} must not be empty")]
    MissingField {
        provider: String,
        field: &'static str,
    },

    #[error("provider '{provider}': base_url '{url}' is not an http(s) URL")]
    InvalidUrl { provider: String, url: String },

    #[error("{0} must be greater than zero")]
    NotPositive(String),

    #[error(
        "timeouts.request_secs ({request_secs}) is shorter than one failover pass \
         (provider_secs x providers = {pass_secs})"
    )]
    RequestDeadlineTooShort { request_secs: u64, pass_secs: u64 },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.providers.is_empty() {
        errors.push(ValidationError::NoProviders);
    }
    if config.circuit_breaker.failure_threshold == 0 {
        errors.push(ValidationError::NotPositive("circuit_breaker.failure_threshold".into()));
    }
    if config.timeouts.provider_secs == 0 {
        errors.push(ValidationError::NotPositive("timeouts.provider_secs".into()));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::NotPositive("timeouts.request_secs".into()));
    }

    // A send must be able to try every provider before the HTTP deadline.
    let pass_secs = config
        .timeouts
        .provider_secs
        .saturating_mul(config.providers.len() as u64);
    if config.timeouts.request_secs < pass_secs {
        errors.push(ValidationError::RequestDeadlineTooShort {
            request_secs: config.timeouts.request_secs,
            pass_secs,
        });
    }

    let mut seen = HashSet::new();
    for provider in &config.providers {
        let label = if provider.name.trim().is_empty() {
            errors.push(ValidationError::MissingField {
                provider: provider.kind.to_string(),
                field: "name",
            });
            provider.kind.to_string()
        } else {
            provider.name.clone()
        };

        if !seen.insert(provider.name.as_str()) {
            errors.push(ValidationError::DuplicateProvider(provider.name.clone()));
        }

        for (field, value) in [("api_key", &provider.api_key), ("sender_id", &provider.sender_id)] {
            if value.trim().is_empty() {
                errors.push(ValidationError::MissingField {
                    provider: label.clone(),
                    field,
                });
            }
        }

        let url_ok = Url::parse(&provider.base_url)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
            .unwrap_or(false);
        if !url_ok {
            errors.push(ValidationError::InvalidUrl {
                provider: label.clone(),
                url: provider.base_url.clone(),
            });
        }

        if provider.failure_threshold == Some(0) {
            errors.push(ValidationError::NotPositive(format!(
                "providers.{}.failure_threshold",
                label
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
