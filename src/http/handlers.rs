//! Route handlers.


use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::gateway::{HealthStatus, SendRequest, SendResult};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::resilience::BreakerStatus;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub providers: IndexMap<String, BreakerStatus>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: &'static str,
}

/// `POST /sms/send`
///
/// 200 when a provider accepted the message, 503 when none did.
pub async fn send_sms(
    State(state): State<AppState>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SendResult>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let result = state.gateway.send(&request).await;
    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    Ok((status, Json(result)))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let report = state.gateway.health();
    let status = match report.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (
        status,
        Json(HealthResponse {
            status: report.status,
            timestamp: Utc::now(),
            providers: report.providers,
        }),
    )
}

/// `GET /circuit-breaker-status`
pub async fn circuit_breaker_status(
    State(state): State<AppState>,
) -> Json<IndexMap<String, BreakerStatus>> {
    Json(state.gateway.circuit_breaker_status())
}

/// `POST /circuit-breaker/reset`
pub async fn reset_circuit_breakers(State(state): State<AppState>) -> Json<ResetResponse> {
    state.gateway.reset_circuit_breakers();
    Json(ResetResponse {
        status: "circuit breakers reset",
    })
}
