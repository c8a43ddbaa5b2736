//! HTTP server lifecycle.
//!
//! Binds the configured address, mounts `api_router()`, and serves until
//! the shutdown future resolves (Ctrl-C in production).

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;

use crate::api::router::api_router;
use crate::core_state::CoreState;

/// Serve the API on `addr` until `shutdown` completes.
pub async fn serve(
    core: Arc<CoreState>,
    addr: SocketAddr,
    cors_origins: &[String],
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve_on(listener, api_router(core, cors_origins), shutdown).await
}

async fn serve_on(
    listener: tokio::net::TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "API server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("API server stopped");
    Ok(())
}

/// Resolves on Ctrl-C. A failing signal handler resolves immediately.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    tracing::info!("Shutdown signal received");
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
