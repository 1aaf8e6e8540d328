use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, routing::get, routing::post};
use tokio::net::TcpListener;
use tower_http::decompression::RequestDecompressionLayer;
use tracing::{error, info};

use super::{
    services::{
        download_artifact, encrypt_pdf, health, list_history, merge_images, merge_pdfs,
        reorder_pdf, split_pdf, update_metadata,
    },
    state::AppState,
};
use crate::config::Config;
use crate::pdf::LopdfBackend;
use crate::workflow::Workflow;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the API router for an already opened workflow
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/history", get(list_history))
        .route("/files/{filename}", get(download_artifact))
        .route("/merge", post(merge_pdfs))
        .route("/split", post(split_pdf))
        .route("/reorder", post(reorder_pdf))
        .route("/metadata", post(update_metadata))
        .route("/images/merge", post(merge_images))
        .route("/encrypt", post(encrypt_pdf))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        // gzip-encoded uploads are inflated before they reach the handlers
        .layer(RequestDecompressionLayer::new())
}

pub async fn run(config: Config, address: Option<SocketAddr>) -> Result<(), AnyError> {
    let address = address.unwrap_or(config.server.bind_addr);

    info!(
        root = %config.storage.root_dir.display(),
        ledger = %config.ledger.path.display(),
        "Opening output store and history ledger"
    );
    let workflow = Workflow::open(&config, Arc::new(LopdfBackend::new()))
        .map_err(|e| format!("Failed to open history ledger: {}", e))?;

    let app = router(AppState::new(config, workflow));

    let listener = TcpListener::bind(address).await?;
    info!(%address, "pdfdesk API listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
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
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
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
