// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Black-box boundary to the embedding backend.

use anyhow::Result;
use async_trait::async_trait;

/// A loaded embedding model.
///
/// `encode` is order-preserving and all-or-nothing: either every input
/// text gets a vector, in input order, or the whole call fails. The
/// service never returns partial results.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a batch of texts in one call. An empty batch yields an
    /// empty result, not an error.
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Output dimensionality, constant for the lifetime of the provider.
    fn dimension(&self) -> usize;

    /// Model identifier for logging.
    fn model_name(&self) -> &str;
}
