//! Application builder: wires state, router, and the background sweeper,
//! then serves until shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::sync::watch;
use tracing::{error, info, warn};

use usergate_admission::{AdmissionControl, SystemClock};
use usergate_core::config::AppConfig;
use usergate_core::error::AppError;
use usergate_database::UserStore;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the UserGate server until Ctrl+C, then drains in-flight requests
/// for at most `server.shutdown_grace_seconds`.
pub async fn run_server(config: AppConfig, users: Arc<dyn UserStore>) -> Result<(), AppError> {
    info!("Starting UserGate server...");

    let admission = Arc::new(AdmissionControl::from_config(
        &config.admission,
        Arc::new(SystemClock),
    )?);
    let sweeper = admission.spawn_sweeper(Duration::from_secs(
        config.admission.sweep_interval_seconds.max(1),
    ));

    let addr = config.server.bind_addr()?;
    let grace = config.server.shutdown_grace();

    let state = AppState::new(config, users, admission);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(%addr, "UserGate server listening");

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await
    });

    let result = tokio::select! {
        joined = &mut server => Some(joined),
        _ = shutdown_signal() => None,
    };

    let joined = match result {
        Some(joined) => joined,
        None => {
            info!(grace_seconds = grace.as_secs(), "Shutdown signal received, draining");
            let _ = shutdown_tx.send(true);
            match tokio::time::timeout(grace, &mut server).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!("Graceful shutdown timed out, aborting open connections");
                    server.abort();
                    sweeper.abort();
                    return Ok(());
                }
            }
        }
    };

    sweeper.abort();
    joined
        .map_err(|e| AppError::internal(format!("Server task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("UserGate server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}
