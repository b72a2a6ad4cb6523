//! Configuration loading from a TOML file or the environment.

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, ProviderConfig};
use crate::config::validation::{validate_config, ValidationError};
use crate::providers::ProviderKind;

const ARKESEL_DEFAULT_URL: &str = "https://sms.arkesel.com";
const MNOTIFY_DEFAULT_URL: &str = "https://api.mnotify.com";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {message}")]
    Env { var: String, message: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid endpoint for provider '{provider}': {source}")]
    Endpoint {
        provider: String,
        #[source]
        source: url::ParseError,
    },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load from `path` when given, otherwise from the environment.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => from_env(),
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate TOML configuration text.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from process environment variables.
pub fn from_env() -> Result<GatewayConfig, ConfigError> {
    from_lookup(|key| env::var(key).ok())
}

/// Build configuration from an arbitrary variable source.
///
/// Variables:
/// - `ARKESEL_API_KEY`, `ARKESEL_API_URL`, `ARKESEL_SENDER_ID`
/// - `MNOTIFY_API_KEY`, `MNOTIFY_API_URL`, `MNOTIFY_SENDER_ID`
/// - `FAILURE_THRESHOLD`, `RESET_TIMEOUT`, `PROVIDER_TIMEOUT`, `REQUEST_TIMEOUT`
/// - `BIND_ADDRESS`, `ADMIN_API_KEY`
/// - `LOG_LEVEL`, `METRICS_ENABLED`, `METRICS_ADDRESS`
///
/// A provider is configured when its key or sender id is present. Arkesel
/// is tried before Mnotify.
pub fn from_lookup<F>(lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = GatewayConfig::default();

    for (priority, (kind, prefix, default_url)) in [
        (ProviderKind::Arkesel, "ARKESEL", ARKESEL_DEFAULT_URL),
        (ProviderKind::Mnotify, "MNOTIFY", MNOTIFY_DEFAULT_URL),
    ]
    .into_iter()
    .enumerate()
    {
        let api_key = lookup(&format!("{prefix}_API_KEY"));
        let sender_id = lookup(&format!("{prefix}_SENDER_ID"));
        if api_key.is_none() && sender_id.is_none() {
            continue;
        }
        config.providers.push(ProviderConfig {
            name: kind.to_string(),
            kind,
            base_url: lookup(&format!("{prefix}_API_URL")).unwrap_or_else(|| default_url.to_string()),
            api_key: api_key.unwrap_or_default(),
            sender_id: sender_id.unwrap_or_default(),
            priority: priority as u32,
            failure_threshold: None,
            reset_timeout_secs: None,
        });
    }

    if let Some(v) = parse_var(&lookup, "FAILURE_THRESHOLD")? {
        config.circuit_breaker.failure_threshold = v;
    }
    if let Some(v) = parse_var(&lookup, "RESET_TIMEOUT")? {
        config.circuit_breaker.reset_timeout_secs = v;
    }
    if let Some(v) = parse_var(&lookup, "PROVIDER_TIMEOUT")? {
        config.timeouts.provider_secs = v;
    }
    if let Some(v) = parse_var(&lookup, "REQUEST_TIMEOUT")? {
        config.timeouts.request_secs = v;
    }
    if let Some(v) = parse_var(&lookup, "METRICS_ENABLED")? {
        config.observability.metrics_enabled = v;
    }
    if let Some(v) = lookup("BIND_ADDRESS") {
        config.server.bind_address = v;
    }
    if let Some(v) = lookup("METRICS_ADDRESS") {
        config.observability.metrics_address = v;
    }
    if let Some(v) = lookup("LOG_LEVEL") {
        config.observability.log_level = v;
    }
    config.admin.api_key = lookup("ADMIN_API_KEY").filter(|k| !k.is_empty());

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn parse_var<F, T>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e: T::Err| ConfigError::Env {
            var: var.to_string(),
            message: format!("'{}': {}", raw, e),
        }),
    }
}
