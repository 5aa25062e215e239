// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};

/// Request body for POST /embeddings.
///
/// Order is significant: the response carries one vector per text, in
/// input order. An empty list is valid and yields an empty result. No
/// upper bound on batch size is enforced here; provider limits surface
/// as per-request failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsRequest {
    pub texts: Vec<String>,
}
