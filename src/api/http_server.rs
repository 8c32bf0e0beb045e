// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::classify::{classify_handler, classify_upload_handler};
use super::handlers::{health_handler, labels_handler, version_handler};
use crate::classifier::Classifier;

/// Largest request body accepted; leaves room for base64 and multipart overhead
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<Classifier>,
}

impl AppState {
    pub fn new(classifier: Arc<Classifier>) -> Self {
        Self { classifier }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/v1/labels", get(labels_handler))
        .route("/v1/classify", post(classify_handler))
        .route("/v1/classify/upload", post(classify_upload_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the classifier until Ctrl+C
pub async fn start_server(classifier: Arc<Classifier>, addr: SocketAddr) -> Result<()> {
    let app = create_router(AppState::new(classifier));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind API server to {}", addr))?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, stopping API server");
        })
        .await
        .context("API server failed")?;

    Ok(())
}
