use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{
    services::{cached_file, health, preflight, resolve_audio, stats, stream_audio},
    state::AppState,
};
use crate::config::Config;
use crate::storage::StorageClient;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All routes over a prepared state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/audio/resolve", get(resolve_audio))
        .route(
            "/v1/audio/stream",
            get(stream_audio).head(stream_audio).options(stream_audio),
        )
        .route("/v1/audio/files/{file_id}", get(cached_file).options(preflight))
        .route("/operators/health", get(health))
        .route("/operators/stats", get(stats))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(
    address: Option<SocketAddr>,
    config_path: Option<PathBuf>,
) -> Result<(), AnyError> {
    info!("Loading configuration");
    let config = match config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
    .map_err(|e| format!("Failed to load config: {}", e))?;

    info!(
        provider = ?config.storage.provider,
        bucket = %config.proxy.cache_bucket,
        "Opening blob store"
    );
    let storage = StorageClient::from_config(&config.storage)
        .map_err(|e| format!("Failed to open storage: {}", e))?;

    info!(
        origins = ?config.proxy.allowed_origins,
        "Allowed origins"
    );

    let address = address.unwrap_or(config.server.bind_addr);
    let state = AppState::new(&config.proxy, Arc::new(storage))
        .map_err(|e| format!("Failed to build proxy: {}", e))?;

    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "Audio proxy listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
