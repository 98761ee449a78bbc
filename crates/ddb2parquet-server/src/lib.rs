// Click ingest server
//
// Accepts click events from the website over HTTP and writes each one into
// the source table the exporter later scans. Any origin may post.

use anyhow::{Context, Result};
use aws_config::SdkConfig;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ddb2parquet_config::RuntimeConfig;
use serde_json::json;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

mod handlers;
mod store;

use handlers::{handle_click, health_check};
pub use store::{row_to_item, ClickStore, DynamoDbClickStore};

/// Application state shared across all requests
#[derive(Clone)]
pub(crate) struct AppState {
    pub store: Arc<dyn ClickStore>,
}

/// Error type that implements IntoResponse
pub(crate) struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request error: {:?}", self.error);
        }
        (
            self.status,
            Json(json!({
                "error": self.error.to_string(),
            })),
        )
            .into_response()
    }
}

impl AppError {
    pub fn with_status(status: StatusCode, error: anyhow::Error) -> Self {
        Self { status, error }
    }

    pub fn bad_request(message: &'static str) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, anyhow::anyhow!(message))
    }

    pub fn internal(message: &'static str) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, anyhow::anyhow!(message))
    }
}

/// Routes for the ingest server
pub fn router(store: Arc<dyn ClickStore>) -> Router {
    Router::new()
        .route("/clicks", post(handle_click))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { store })
}

/// DynamoDB store for the configured source table
pub fn build_store(config: &RuntimeConfig, sdk: &SdkConfig) -> Arc<dyn ClickStore> {
    Arc::new(DynamoDbClickStore::new(
        aws_sdk_dynamodb::Client::new(sdk),
        config.export.source_table.clone(),
    ))
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}

/// Serve the ingest routes until Ctrl+C or SIGTERM
pub async fn run(config: &RuntimeConfig, store: Arc<dyn ClickStore>) -> Result<()> {
    let addr = config.server.listen_addr.as_str();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(table = %config.export.source_table, "Click ingest listening on http://{}", addr);
    info!("  POST http://{}/clicks - Log a click event", addr);
    info!("  GET  http://{}/health - Health check", addr);

    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}
