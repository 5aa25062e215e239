// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX sentence-transformer wrapper.
//!
//! Wraps ONNX Runtime around an exported sentence-transformer model:
//! - model + tokenizer loading from disk
//! - CUDA execution with automatic CPU fallback
//! - batch tokenization with padding
//! - masked mean pooling over token embeddings, L2 normalization
//!
//! The output dimension is probed with a validation inference at load
//! time; the model, not this wrapper, owns dimensionality.

use anyhow::{Context, Result};
use async_trait::async_trait;
use ndarray::{Array2, Axis};
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;
use tracing::{info, warn};

use crate::config::Precision;
use crate::embeddings::EmbeddingProvider;

/// ONNX-based sentence embedding model.
///
/// # Thread Safety
/// The session sits behind `Arc<Mutex>`; concurrent `encode` calls are
/// serialized by the lock, which is inherited behavior, not a designed
/// queue.
#[derive(Clone)]
pub struct OnnxSentenceEncoder {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    model_name: String,
    dimension: usize,
}

impl std::fmt::Debug for OnnxSentenceEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxSentenceEncoder")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl OnnxSentenceEncoder {
    /// Maps the precision hint to the ONNX artifact name used by
    /// sentence-transformer exports. This is the only place the hint is
    /// interpreted.
    pub fn artifact_name(precision: Precision) -> &'static str {
        match precision {
            Precision::Float32 => "model.onnx",
            Precision::Float16 => "model_fp16.onnx",
        }
    }

    /// Loads the model and tokenizer from disk.
    ///
    /// Tries the CUDA execution provider first and falls back to CPU.
    /// Runs one validation inference to discover the output dimension.
    ///
    /// # Errors
    /// Returns an error if either file is missing or invalid, if ONNX
    /// Runtime initialization fails, or if the model output is not a
    /// `[batch, seq_len, hidden_dim]` tensor.
    pub fn load(
        model_name: impl Into<String>,
        model_path: &Path,
        tokenizer_path: &Path,
    ) -> Result<Self> {
        let model_name = model_name.into();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        let cuda_result = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CUDAExecutionProvider::default().build()])
            .context("Failed to set CUDA execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path);

        let mut session = match cuda_result {
            Ok(s) => {
                info!("CUDA execution provider initialized");
                s
            }
            Err(e) => {
                warn!("CUDA execution provider unavailable ({}), using CPU", e);
                Session::builder()
                    .context("Failed to create session builder")?
                    .with_execution_providers([CPUExecutionProvider::default().build()])
                    .context("Failed to set CPU execution provider")?
                    .with_optimization_level(GraphOptimizationLevel::Level3)
                    .context("Failed to set optimization level")?
                    .with_intra_threads(4)
                    .context("Failed to set intra threads")?
                    .commit_from_file(model_path)
                    .with_context(|| {
                        format!("Failed to load ONNX model from {}", model_path.display())
                    })?
            }
        };

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        // Validation inference; discovers the output dimension.
        let probe = run_batch(&mut session, &tokenizer, &["validation test".to_string()])?;
        let dimension = probe
            .first()
            .map(|v| v.len())
            .context("Validation inference returned no embedding")?;

        info!(
            "Loaded ONNX embedding model {} ({} dimensions)",
            model_name, dimension
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name,
            dimension,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OnnxSentenceEncoder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Embedding session lock poisoned"))?;
        let embeddings = run_batch(&mut session, &self.tokenizer, texts)?;

        for (i, embedding) in embeddings.iter().enumerate() {
            if embedding.len() != self.dimension {
                anyhow::bail!(
                    "Unexpected embedding dimension at index {}: {} (expected {})",
                    i,
                    embedding.len(),
                    self.dimension
                );
            }
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Tokenizes a batch, runs inference, and pools token embeddings into one
/// L2-normalized sentence vector per input, in input order.
fn run_batch(
    session: &mut Session,
    tokenizer: &Tokenizer,
    texts: &[String],
) -> Result<Vec<Vec<f32>>> {
    let encodings: Vec<_> = texts
        .iter()
        .map(|text| {
            tokenizer
                .encode(text.as_str(), true)
                .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
        })
        .collect::<Result<Vec<_>>>()?;

    let max_len = encodings
        .iter()
        .map(|enc| enc.get_ids().len())
        .max()
        .unwrap_or(0);

    // Pad all sequences to the longest in the batch.
    let mut input_ids = Vec::with_capacity(texts.len() * max_len);
    let mut attention_mask = Vec::with_capacity(texts.len() * max_len);
    let mut token_type_ids = Vec::with_capacity(texts.len() * max_len);

    for encoding in &encodings {
        let ids = encoding.get_ids();
        let mask = encoding.get_attention_mask();

        input_ids.extend(ids.iter().map(|&id| id as i64));
        attention_mask.extend(mask.iter().map(|&m| m as i64));
        token_type_ids.extend(std::iter::repeat(0i64).take(ids.len()));

        let padding = max_len - ids.len();
        input_ids.extend(std::iter::repeat(0i64).take(padding));
        attention_mask.extend(std::iter::repeat(0i64).take(padding));
        token_type_ids.extend(std::iter::repeat(0i64).take(padding));
    }

    let mask_for_pooling = attention_mask.clone();

    let input_ids_array = Array2::from_shape_vec((texts.len(), max_len), input_ids)
        .context("Failed to create input_ids array")?;
    let attention_mask_array = Array2::from_shape_vec((texts.len(), max_len), attention_mask)
        .context("Failed to create attention_mask array")?;
    let token_type_ids_array = Array2::from_shape_vec((texts.len(), max_len), token_type_ids)
        .context("Failed to create token_type_ids array")?;

    let outputs = session.run(ort::inputs![
        "input_ids" => Value::from_array(input_ids_array)?,
        "attention_mask" => Value::from_array(attention_mask_array)?,
        "token_type_ids" => Value::from_array(token_type_ids_array)?
    ])?;

    // Index [0] instead of a name; output names vary between exports.
    let output_array = outputs[0]
        .try_extract_array::<f32>()
        .context("Failed to extract output tensor")?;

    let shape = output_array.shape().to_vec();
    if shape.len() != 3 {
        anyhow::bail!(
            "Model output has unexpected shape {:?} (expected [batch, seq_len, hidden_dim])",
            shape
        );
    }

    let mut embeddings = Vec::with_capacity(texts.len());

    for batch_idx in 0..texts.len() {
        let item = output_array.index_axis(Axis(0), batch_idx); // [seq_len, hidden_dim]
        let seq_len = item.shape()[0];
        let hidden_dim = item.shape()[1];
        let item_mask = &mask_for_pooling[batch_idx * max_len..(batch_idx + 1) * max_len];

        // Mean pooling weighted by the attention mask, so padding tokens
        // do not dilute the sentence vector.
        let mut pooled = vec![0.0f32; hidden_dim];
        let mut sum_mask = 0.0f32;

        for i in 0..seq_len {
            let mask_value = item_mask[i] as f32;
            sum_mask += mask_value;
            for j in 0..hidden_dim {
                pooled[j] += item[[i, j]] * mask_value;
            }
        }

        for val in &mut pooled {
            *val /= sum_mask.max(1e-9);
        }

        let norm = pooled.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut pooled {
                *val /= norm;
            }
        }

        embeddings.push(pooled);
    }

    Ok(embeddings)
}
