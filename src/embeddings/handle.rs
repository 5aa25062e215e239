// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! One-shot model lifecycle.
//!
//! The model is loaded exactly once at process start. The outcome, Ready
//! or Unready, is written into a [`ModelHandle`] that is shared read-only
//! with the request handlers for the rest of the process lifetime. A
//! failed load never aborts startup; the failure reason is kept so the
//! service can still answer health checks and reject embedding requests
//! with a stable error.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::ServiceConfig;
use crate::embeddings::{EmbeddingProvider, OnnxSentenceEncoder};

/// Outcome of the startup load attempt.
///
/// Written once during startup with no concurrent writers; never
/// transitions back from Ready to Unready during a run.
pub enum ModelHandle {
    Ready(Arc<dyn EmbeddingProvider>),
    Unready { reason: String },
}

impl ModelHandle {
    pub fn ready(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self::Ready(provider)
    }

    pub fn unready(reason: impl Into<String>) -> Self {
        Self::Unready {
            reason: reason.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn provider(&self) -> Option<Arc<dyn EmbeddingProvider>> {
        match self {
            Self::Ready(provider) => Some(Arc::clone(provider)),
            Self::Unready { .. } => None,
        }
    }

    /// Captured load failure, if any.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Unready { reason } => Some(reason),
        }
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(provider) => f
                .debug_struct("ModelHandle::Ready")
                .field("model_name", &provider.model_name())
                .field("dimension", &provider.dimension())
                .finish(),
            Self::Unready { reason } => f
                .debug_struct("ModelHandle::Unready")
                .field("reason", reason)
                .finish(),
        }
    }
}

/// Attempts the one startup load and captures the outcome.
///
/// Exactly one load path is exercised per startup: the configured local
/// directory if it exists, otherwise a hub download by model name. Any
/// failure is logged and held as Unready; this function never panics and
/// never propagates an error.
pub async fn initialize(config: &ServiceConfig) -> ModelHandle {
    match try_load(config).await {
        Ok(provider) => {
            info!(
                "Embedding model {} ready ({} dimensions)",
                provider.model_name(),
                provider.dimension()
            );
            ModelHandle::Ready(provider)
        }
        Err(e) => {
            let reason = format!("{:#}", e);
            error!("Failed to load embedding model: {}", reason);
            ModelHandle::Unready { reason }
        }
    }
}

async fn try_load(config: &ServiceConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let (model_path, tokenizer_path) = locate_model_files(config).await?;

    let model_name = config.model_name.clone();
    let encoder = tokio::task::spawn_blocking(move || {
        OnnxSentenceEncoder::load(model_name, &model_path, &tokenizer_path)
    })
    .await
    .context("Model loading task panicked")??;

    Ok(Arc::new(encoder))
}

/// Resolves the model and tokenizer files, preferring the local directory
/// and falling back to a Hugging Face hub download.
async fn locate_model_files(config: &ServiceConfig) -> Result<(PathBuf, PathBuf)> {
    let artifact = OnnxSentenceEncoder::artifact_name(config.precision);

    if config.local_model_path.is_dir() {
        info!(
            "Loading embedding model from local path {}",
            config.local_model_path.display()
        );
        return Ok((
            config.local_model_path.join(artifact),
            config.local_model_path.join("tokenizer.json"),
        ));
    }

    info!(
        "Local model path {} not found, downloading {} from the Hugging Face hub",
        config.local_model_path.display(),
        config.model_name
    );

    // hf-hub's API is blocking; keep it off the runtime threads.
    let model_name = config.model_name.clone();
    tokio::task::spawn_blocking(move || -> Result<(PathBuf, PathBuf)> {
        let api = hf_hub::api::sync::Api::new().context("Failed to initialize hub client")?;
        let repo = api.model(model_name.clone());
        let model_path = repo
            .get(artifact)
            .with_context(|| format!("Failed to download {} for {}", artifact, model_name))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .with_context(|| format!("Failed to download tokenizer.json for {}", model_name))?;
        Ok((model_path, tokenizer_path))
    })
    .await
    .context("Model download task panicked")?
}
