// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! HTTP surface: `/embeddings` and `/health`.

pub mod embeddings;
pub mod errors;
pub mod health;
pub mod http_server;

pub use embeddings::EmbeddingsRequest;
pub use errors::{EmbedError, ErrorBody};
pub use health::HealthResponse;
pub use http_server::{create_app, start_server, AppState};
