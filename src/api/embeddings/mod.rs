// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embeddings endpoint.

mod handler;
mod request;

pub use handler::embeddings_handler;
pub use request::EmbeddingsRequest;
