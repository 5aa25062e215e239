// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /health handler.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::http_server::AppState;

/// Response body for GET /health.
///
/// `status` reflects process liveness and is always `"ok"`; model
/// readiness is the separate `model_loaded` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

/// Reports liveness and model readiness.
///
/// Reads the handle state only; never invokes the provider and never
/// fails, regardless of model state.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: state.model.is_ready(),
    })
}
