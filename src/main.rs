//! SMS failover gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     POST /sms/send
//!     ──────────────▶ http ──▶ gateway (failover orchestrator)
//!                                 │
//!                                 ├─▶ breaker[0] ─▶ provider[0] (Arkesel)
//!                                 ├─▶ breaker[1] ─▶ provider[1] (mNotify)
//!                                 └─▶ ...
//!
//!     config ─ observability ─ lifecycle (cross-cutting)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use sms_gateway::config;
use sms_gateway::lifecycle::{signals, Shutdown};
use sms_gateway::observability::{logging, metrics};
use sms_gateway::{FailoverOrchestrator, GatewayServer};

#[derive(Parser)]
#[command(name = "sms-gateway")]
#[command(about = "SMS gateway with per-provider circuit breakers and failover", long_about = None)]
struct Args {
    /// TOML configuration file. Environment variables are used when absent.
    #[arg(short, long, env = "SMS_GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to read .env: {e}");
        }
    }

    let config = config::load(args.config.as_deref())?;
    logging::init(&config.observability.log_level);

    tracing::info!("sms-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let gateway = Arc::new(FailoverOrchestrator::from_config(&config)?);
    tracing::info!(
        bind_address = %config.server.bind_address,
        providers = ?gateway.provider_names(),
        failure_threshold = config.circuit_breaker.failure_threshold,
        reset_timeout_secs = config.circuit_breaker.reset_timeout_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.server.bind_address).await?;

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_shutdown().await;
        shutdown.trigger();
    });

    GatewayServer::new(&config, gateway).run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
