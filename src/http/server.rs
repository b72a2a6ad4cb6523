//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with every gateway route
//! - Wire up middleware (request id, tracing, timeout, body limit)
//! - Serve on a listener until shutdown is broadcast

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::gateway::FailoverOrchestrator;
use crate::http::auth::require_admin;
use crate::http::handlers;
use crate::lifecycle::shutdown;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<FailoverOrchestrator>,
    pub admin_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(gateway: Arc<FailoverOrchestrator>, admin_key: Option<&str>) -> Self {
        Self {
            gateway,
            admin_key: admin_key.map(Arc::from),
        }
    }
}

/// HTTP front end for the failover gateway.
pub struct GatewayServer {
    router: Router,
}

impl GatewayServer {
    pub fn new(config: &GatewayConfig, gateway: Arc<FailoverOrchestrator>) -> Self {
        let state = AppState::new(gateway, config.admin.api_key.as_deref());
        Self {
            router: build_router(config, state),
        }
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until the shutdown receiver fires; in-flight requests drain first.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Slack on top of a full failover pass before the HTTP deadline fires.
const PASS_GRACE: Duration = Duration::from_secs(1);

/// Build the Axum router with all middleware layers.
///
/// The request deadline never undercuts a full failover pass, so a send
/// always ends in a [`SendResult`](crate::gateway::SendResult).
#[allow(deprecated)]
pub fn build_router(config: &GatewayConfig, state: AppState) -> Router {
    let request_timeout = config
        .timeouts
        .request()
        .max(state.gateway.pass_budget() + PASS_GRACE);

    let operator = Router::new()
        .route(
            "/circuit-breaker/reset",
            post(handlers::reset_circuit_breakers),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/sms/send", post(handlers::send_sms))
        .route("/health", get(handlers::health))
        .route(
            "/circuit-breaker-status",
            get(handlers::circuit_breaker_status),
        )
        .merge(operator)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.server.max_body_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
