// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Service configuration from environment variables.
//!
//! Every variable has a default so the service always starts; bad values
//! fall back with a warning rather than aborting startup.

use std::env;
use std::path::PathBuf;
use tracing::warn;

/// Default logical model id on the Hugging Face hub.
pub const DEFAULT_MODEL_NAME: &str = "BAAI/bge-multilingual-gemma2";

/// Default local model directory, checked before any remote download.
pub const DEFAULT_LOCAL_MODEL_PATH: &str = "/app/models/bge-multilingual-gemma2";

/// Default bind port.
pub const DEFAULT_API_PORT: u16 = 8000;

/// Numeric precision hint forwarded to the embedding provider.
///
/// The config layer only parses the hint; what it means (which ONNX
/// artifact gets loaded) is decided by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    #[default]
    Float32,
    Float16,
}

impl Precision {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "float32" | "fp32" | "full" => Some(Self::Float32),
            "float16" | "fp16" | "half" => Some(Self::Float16),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Float32 => "float32",
            Self::Float16 => "float16",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Logical model id used for hub downloads (`MODEL_NAME`).
    pub model_name: String,
    /// Local directory holding the model artifacts (`LOCAL_MODEL_PATH`).
    pub local_model_path: PathBuf,
    /// Precision hint passed through to the provider (`MODEL_PRECISION`).
    pub precision: Precision,
    /// HTTP bind port (`API_PORT`).
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            local_model_path: PathBuf::from(DEFAULT_LOCAL_MODEL_PATH),
            precision: Precision::Float32,
            port: DEFAULT_API_PORT,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let model_name =
            env::var("MODEL_NAME").unwrap_or_else(|_| DEFAULT_MODEL_NAME.to_string());

        let local_model_path = env::var("LOCAL_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOCAL_MODEL_PATH));

        let precision = match env::var("MODEL_PRECISION") {
            Ok(raw) => Precision::parse(&raw).unwrap_or_else(|| {
                warn!("Unrecognized MODEL_PRECISION '{}', using float32", raw);
                Precision::Float32
            }),
            Err(_) => Precision::Float32,
        };

        let port = env::var("API_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(DEFAULT_API_PORT);

        Self {
            model_name,
            local_model_path,
            precision,
            port,
        }
    }
}
