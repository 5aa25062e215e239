// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};

use crate::api::embeddings::embeddings_handler;
use crate::api::health::health_handler;
use crate::embeddings::ModelHandle;

/// Shared state for the request handlers.
///
/// The model handle is written once at startup and read-only here, so no
/// locking is needed on the request path.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ModelHandle>,
}

pub fn create_app(model: Arc<ModelHandle>) -> Router {
    Router::new()
        .route("/embeddings", post(embeddings_handler))
        .route("/health", get(health_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(AppState { model })
}

pub async fn start_server(port: u16, model: Arc<ModelHandle>) -> Result<()> {
    let app = create_app(model);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Embedding service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received, stopping server");
}
