//! Data Transfer Objects matching the search backend's wire schema.
//!
//! Field names use `camelCase` on the wire and `snake_case` in Rust code
//! via `#[serde(rename_all = "camelCase")]`.

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Similarity search
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST /api/search — request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Minimum similarity threshold (0.0-1.0). The adapter re-applies
    /// this as a hard floor client-side regardless of backend behavior.
    pub threshold: f32,
}

/// POST /api/search — response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHitDto>,
}

/// One ranked hit from the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHitDto {
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    pub content: String,
    #[serde(default)]
    pub similarity: Option<f64>,
}
