// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embeddings HTTP handler.

use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info};

use crate::api::embeddings::EmbeddingsRequest;
use crate::api::errors::EmbedError;
use crate::api::http_server::AppState;

/// Embeds a batch of texts with the startup-loaded model.
///
/// The whole batch goes to the provider in a single call; no chunking
/// happens here, and no partial results are ever returned.
///
/// The success body is a JSON string literal containing the JSON text of
/// the vector list (`"[[0.1, ...], ...]"`). Existing clients parse the
/// body twice, so the double encoding is part of the interface.
pub async fn embeddings_handler(
    State(state): State<AppState>,
    request: Result<Json<EmbeddingsRequest>, JsonRejection>,
) -> Response {
    // Malformed bodies get the same JSON error shape as every other
    // failure; no request ends without well-formed JSON.
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => {
            error!("Rejected embeddings request: {}", rejection.body_text());
            return EmbedError::InvalidRequest(rejection.body_text()).into_response();
        }
    };

    let Some(provider) = state.model.provider() else {
        return EmbedError::ModelNotInitialized.into_response();
    };

    info!("Embedding batch of {} texts", request.texts.len());

    match provider.encode(&request.texts).await {
        Ok(vectors) => match serde_json::to_string(&vectors) {
            Ok(payload) => Json(payload).into_response(),
            Err(e) => {
                error!("Failed to serialize embeddings: {}", e);
                EmbedError::Provider(e.to_string()).into_response()
            }
        },
        Err(e) => {
            let message = format!("{:#}", e);
            error!("Embedding request failed: {}", message);
            EmbedError::Provider(message).into_response()
        }
    }
}
