// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use embedding_service::{api, config::ServiceConfig, embeddings};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = ServiceConfig::from_env();
    tracing::info!(
        "Starting embedding service (model: {}, local path: {}, precision: {})",
        config.model_name,
        config.local_model_path.display(),
        config.precision.as_str()
    );

    // A failed load is captured in the handle; the service still starts
    // and answers health checks.
    let model = Arc::new(embeddings::initialize(&config).await);

    api::start_server(config.port, model).await
}
