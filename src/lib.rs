// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! HTTP service exposing a sentence-embedding model.
//!
//! Two endpoints: `POST /embeddings` converts a batch of texts into
//! vectors via an ONNX sentence transformer, `GET /health` reports
//! process liveness and model readiness. The model is loaded exactly once
//! at startup (local path preferred, Hugging Face hub fallback) and the
//! resulting handle is shared read-only with the request handlers.

pub mod api;
pub mod config;
pub mod embeddings;

pub use config::ServiceConfig;
pub use embeddings::{EmbeddingProvider, ModelHandle};
