// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Contract tests for POST /embeddings.
//!
//! These tests run the real router with a substitute provider and verify:
//! - one vector per input text, in input order
//! - the double-encoded success payload (JSON string containing JSON)
//! - empty batches succeed with an empty result
//! - the unready handle short-circuits without touching a provider
//! - provider failures surface as `{"error": ...}` without partial results

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use embedding_service::api::create_app;
use embedding_service::embeddings::{EmbeddingProvider, ModelHandle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

/// Provider that returns a distinct vector per input position, so order
/// preservation is observable.
struct PositionalProvider {
    dimension: usize,
    calls: AtomicUsize,
}

impl PositionalProvider {
    fn new(dimension: usize) -> Self {
        Self {
            dimension,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for PositionalProvider {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .enumerate()
            .map(|(i, _)| vec![i as f32; self.dimension])
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "positional-test-model"
    }
}

/// Provider that always fails, for the per-request failure path.
struct FailingProvider;

#[async_trait]
impl EmbeddingProvider for FailingProvider {
    async fn encode(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(anyhow!("tensor shape mismatch"))
    }

    fn dimension(&self) -> usize {
        8
    }

    fn model_name(&self) -> &str {
        "failing-test-model"
    }
}

fn app_with_provider(provider: Arc<dyn EmbeddingProvider>) -> Router {
    create_app(Arc::new(ModelHandle::ready(provider)))
}

fn app_unready() -> Router {
    create_app(Arc::new(ModelHandle::unready("model file missing")))
}

async fn post_embeddings(app: Router, body: serde_json::Value) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/embeddings")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body_bytes.to_vec())
}

/// Decodes the double-encoded success payload: the body is a JSON string
/// literal whose content is the JSON text of the vector list.
fn decode_success_payload(body: &[u8]) -> Vec<Vec<f32>> {
    let inner: String = serde_json::from_slice(body).expect("body is not a JSON string literal");
    serde_json::from_str(&inner).expect("inner payload is not a list of vectors")
}

#[tokio::test]
async fn test_two_texts_yield_two_vectors_same_dimension() {
    let app = app_with_provider(Arc::new(PositionalProvider::new(16)));

    let (status, body) = post_embeddings(
        app,
        serde_json::json!({"texts": ["hello", "world"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let vectors = decode_success_payload(&body);
    assert_eq!(vectors.len(), 2);
    assert_eq!(vectors[0].len(), 16);
    assert_eq!(vectors[0].len(), vectors[1].len());
}

#[tokio::test]
async fn test_vectors_preserve_input_order() {
    let app = app_with_provider(Arc::new(PositionalProvider::new(4)));

    let (_, body) = post_embeddings(
        app,
        serde_json::json!({"texts": ["first", "second", "third"]}),
    )
    .await;

    let vectors = decode_success_payload(&body);
    assert_eq!(vectors.len(), 3);
    for (i, vector) in vectors.iter().enumerate() {
        assert_eq!(vector[0], i as f32, "vector {} out of order", i);
    }
}

#[tokio::test]
async fn test_empty_batch_yields_empty_list() {
    let app = app_with_provider(Arc::new(PositionalProvider::new(16)));

    let (status, body) = post_embeddings(app, serde_json::json!({"texts": []})).await;

    assert_eq!(status, StatusCode::OK);
    let vectors = decode_success_payload(&body);
    assert!(vectors.is_empty());
}

#[tokio::test]
async fn test_success_body_is_double_encoded() {
    let app = app_with_provider(Arc::new(PositionalProvider::new(2)));

    let (_, body) = post_embeddings(app, serde_json::json!({"texts": ["x"]})).await;

    // The body must be a JSON string, not a JSON array.
    let outer: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(outer.is_string(), "success body must be a JSON string literal");

    let inner: Vec<Vec<f32>> = serde_json::from_str(outer.as_str().unwrap()).unwrap();
    assert_eq!(inner.len(), 1);
    assert_eq!(inner[0].len(), 2);
}

#[tokio::test]
async fn test_unready_handle_returns_stable_error() {
    let (status, body) = post_embeddings(
        app_unready(),
        serde_json::json!({"texts": ["hello"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        error["error"],
        "Model not initialized. Check server logs."
    );
}

#[tokio::test]
async fn test_unready_handle_error_is_identical_for_every_request() {
    for texts in [
        serde_json::json!({"texts": []}),
        serde_json::json!({"texts": ["a"]}),
        serde_json::json!({"texts": ["a", "b", "c"]}),
    ] {
        let (_, body) = post_embeddings(app_unready(), texts).await;
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            error["error"],
            "Model not initialized. Check server logs."
        );
    }
}

#[tokio::test]
async fn test_provider_failure_surfaces_message() {
    let app = app_with_provider(Arc::new(FailingProvider));

    let (status, body) = post_embeddings(
        app,
        serde_json::json!({"texts": ["hello"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let message = error["error"].as_str().unwrap();
    assert!(
        message.contains("tensor shape mismatch"),
        "unexpected error message: {}",
        message
    );
}

#[tokio::test]
async fn test_malformed_body_still_returns_json_error() {
    let app = app_with_provider(Arc::new(PositionalProvider::new(4)));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/embeddings")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
    assert!(error["error"].is_string());
}

#[tokio::test]
async fn test_ready_provider_is_called_once_per_request() {
    let provider = Arc::new(PositionalProvider::new(4));
    let app = app_with_provider(provider.clone());

    let (_, _) = post_embeddings(app, serde_json::json!({"texts": ["a", "b"]})).await;

    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}
