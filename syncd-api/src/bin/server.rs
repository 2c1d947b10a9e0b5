//! # Sync Daemon API Server
//!
//! Thin wrapper binary for running the control-plane API standalone, backed
//! by the in-memory reference `Controller`. Production deployments are
//! expected to construct `ApiState` with their own driver-registry-backed
//! `Controller` and call into `syncd_api::routes::build` /
//! `syncd_api::transport::serve` directly rather than run this binary.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{error, info};

use syncd_api::health::spawn_evaluator;
use syncd_api::{ApiState, InMemoryController};
use syncd_shared::config::ServerConfig;
use syncd_shared::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_tracing();

    info!("Starting sync daemon API server...");
    info!(version = env!("CARGO_PKG_VERSION"));

    let cfg = load_config();
    let state = ApiState::new(Arc::new(InMemoryController::new()));
    let evaluator = spawn_evaluator(
        Arc::clone(&state.controller),
        Arc::clone(&state.health),
        Duration::from_secs(10),
    );

    let router = syncd_api::routes::build_with_config(state, &cfg);
    let shutdown_drain = cfg.shutdown_drain_secs;

    info!(port = cfg.port, "API server listening");
    info!("Press Ctrl+C to shut down gracefully");

    let result = syncd_api::transport::serve(cfg, router, shutdown_signal()).await;

    evaluator.abort();

    match result {
        Ok(()) => {
            info!("API server shut down cleanly");
        }
        Err(e) => {
            error!(error = %e, "API server exited with an error");
            return Err(Box::new(e));
        }
    }

    let _ = shutdown_drain;
    Ok(())
}

fn load_config() -> ServerConfig {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("syncd").required(false))
        .add_source(config::Environment::with_prefix("SYNCD").separator("__"));

    match builder.build() {
        Ok(source) => source.try_deserialize().unwrap_or_else(|e| {
            error!(error = %e, "invalid configuration, falling back to defaults");
            ServerConfig::default()
        }),
        Err(e) => {
            error!(error = %e, "failed to load configuration, falling back to defaults");
            ServerConfig::default()
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl+C");
        },
        _ = terminate => {
            info!("received SIGTERM");
        },
    }
}
