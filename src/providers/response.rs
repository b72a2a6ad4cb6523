//! Shared response classification for provider adapters.
//!
//! Transport failures, HTTP status, and body decoding are handled the same
//! way for every provider; only the success payload differs.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::providers::{ProviderError, ProviderErrorKind};

/// Longest slice of an upstream body quoted in an error message.
const MAX_QUOTED_BODY: usize = 200;

/// Map a reqwest failure to a provider error.
///
/// The URL is stripped first: some providers carry credentials in the
/// query string.
pub fn transport_error(provider: &str, err: reqwest::Error) -> ProviderError {
    let err = err.without_url();
    if err.is_timeout() {
        ProviderError::new(provider, ProviderErrorKind::Network, "request timed out")
    } else if err.is_decode() {
        ProviderError::new(provider, ProviderErrorKind::MalformedResponse, err.to_string())
    } else {
        ProviderError::new(provider, ProviderErrorKind::Network, err.to_string())
    }
}

/// Map a non-success HTTP status to a provider error.
pub fn status_error(provider: &str, status: StatusCode, body: &str) -> ProviderError {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderErrorKind::Auth,
        StatusCode::TOO_MANY_REQUESTS => ProviderErrorKind::Network,
        s if s.is_server_error() => ProviderErrorKind::Network,
        _ => ProviderErrorKind::Rejected,
    };
    let body = quote(body);
    let message = if body.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, body)
    };
    ProviderError::new(provider, kind, message)
}

/// Decode a successful HTTP body.
pub fn decode_body<T: DeserializeOwned>(provider: &str, body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| {
        ProviderError::new(
            provider,
            ProviderErrorKind::MalformedResponse,
            format!("invalid response body ({}): {}", e, quote(body)),
        )
    })
}

/// Read the whole response, classifying status and body.
pub async fn read_response<T: DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(provider, e))?;

    if !status.is_success() {
        return Err(status_error(provider, status, &body));
    }
    decode_body(provider, &body)
}

/// Render a provider-assigned id, which may arrive as a string or a number.
pub fn id_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Render a provider's free-form `message`, which is not always a string.
pub fn message_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        other => Some(quote(&other.to_string()).to_string()),
    }
}

/// Whether a provider's `status` field reports success.
pub fn is_success_status(status: Option<&str>) -> bool {
    status.is_some_and(|s| s.eq_ignore_ascii_case("success"))
}

fn quote(body: &str) -> &str {
    let body = body.trim();
    match body.char_indices().nth(MAX_QUOTED_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Reply {
        status: String,
    }

    #[test]
    fn test_message_text_renders_any_shape() {
        use serde_json::json;
        assert_eq!(message_text(&json!("Invalid sender")).as_deref(), Some("Invalid sender"));
        assert_eq!(message_text(&json!(null)), None);
        assert_eq!(message_text(&json!("  ")), None);
        assert_eq!(
            message_text(&json!({"sender": ["too long"]})).as_deref(),
            Some(r#"{"sender":["too long"]}"#)
        );
    }

    #[test]
    fn test_status_classification() {
        let cases = [
            (StatusCode::UNAUTHORIZED, ProviderErrorKind::Auth),
            (StatusCode::FORBIDDEN, ProviderErrorKind::Auth),
            (StatusCode::BAD_REQUEST, ProviderErrorKind::Rejected),
            (StatusCode::UNPROCESSABLE_ENTITY, ProviderErrorKind::Rejected),
            (StatusCode::TOO_MANY_REQUESTS, ProviderErrorKind::Network),
            (StatusCode::INTERNAL_SERVER_ERROR, ProviderErrorKind::Network),
            (StatusCode::SERVICE_UNAVAILABLE, ProviderErrorKind::Network),
        ];
        for (status, kind) in cases {
            assert_eq!(status_error("p", status, "").kind, kind, "{status}");
        }
    }

    #[test]
    fn test_status_error_quotes_body() {
        let err = status_error("p", StatusCode::BAD_REQUEST, "  invalid sender id \n");
        assert_eq!(err.message, "HTTP 400 Bad Request: invalid sender id");
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "x".repeat(1000);
        let err = status_error("p", StatusCode::BAD_GATEWAY, &body);
        assert!(err.message.len() < 300);
    }

    #[test]
    fn test_id_string() {
        assert_eq!(id_string(&serde_json::json!("abc")), Some("abc".to_string()));
        assert_eq!(id_string(&serde_json::json!(42)), Some("42".to_string()));
        assert_eq!(id_string(&serde_json::json!("")), None);
        assert_eq!(id_string(&serde_json::json!(null)), None);
    }

    #[test]
    fn test_decode_body() {
        let reply: Reply = decode_body("p", r#"{"status":"success"}"#).unwrap();
        assert_eq!(reply.status, "success");

        let err = decode_body::<Reply>("p", "<html>oops</html>").unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::MalformedResponse);
        assert!(err.message.contains("<html>"));
    }
}
