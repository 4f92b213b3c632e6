//! HTTP server for the persona panel.
//!
//! # Endpoints
//!
//! - `POST /api/ai-personas`: Multi-persona consultation
//! - `GET /api/personas`: Persona metadata
//! - `GET /health`: Liveness probe
//! - `GET /health/backend`: Backend reachability

pub mod routes;

use std::future::Future;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ServerSettings;
use crate::error::{Error, Result};

pub use routes::{app_router, AppState};

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(state: AppState, settings: &ServerSettings) -> Result<()> {
    let addr = settings.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Bind {
            addr: addr.clone(),
            source: e,
        })?;

    run(listener, state, settings.cors, shutdown_signal()).await
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn run<F>(listener: TcpListener, state: AppState, cors: bool, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    info!(
        addr = %local_addr,
        backend = state.backend.name(),
        personas = state.registry.len(),
        "Persona panel listening"
    );
    info!("Endpoints: POST /api/ai-personas, GET /api/personas, GET /health, GET /health/backend");

    axum::serve(listener, app_router(state, cors))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Unable to listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}
