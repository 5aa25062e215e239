// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! API error taxonomy and wire shape.
//!
//! Every failure on this API terminates in a well-formed
//! `{"error": "<message>"}` body. Responses carry HTTP 200; existing
//! clients key off the `error` field, not the status code.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed message for requests that arrive before (or after a failed)
/// model load.
pub const MODEL_NOT_INITIALIZED: &str = "Model not initialized. Check server logs.";

/// Wire shape for every failure on this API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum EmbedError {
    /// The startup load failed (or never ran); the provider is not
    /// invoked for these requests.
    #[error("Model not initialized. Check server logs.")]
    ModelNotInitialized,

    /// The request body could not be parsed as `{"texts": [...]}`.
    #[error("{0}")]
    InvalidRequest(String),

    /// The provider failed during `encode`. Per-request; does not affect
    /// the model handle or other requests.
    #[error("{0}")]
    Provider(String),
}

impl EmbedError {
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}

impl IntoResponse for EmbedError {
    fn into_response(self) -> Response {
        Json(self.body()).into_response()
    }
}
