// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding provider boundary and model lifecycle.

pub mod handle;
pub mod onnx_model;
pub mod provider;

pub use handle::{initialize, ModelHandle};
pub use onnx_model::OnnxSentenceEncoder;
pub use provider::EmbeddingProvider;
