use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Retrieval backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Environment variable holding the backend API key. Unset env var
    /// means unauthenticated requests (local backends).
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    /// Maximum chunks returned per turn.
    #[serde(default = "d_top_k")]
    pub top_k: usize,
    /// Hard similarity floor. The backend's own default is often too
    /// strict for short queries; 0.3 gives broader recall.
    #[serde(default = "d_min_similarity")]
    pub min_similarity: f32,
    /// Per-request timeout; the whole retrieval stage is also bounded
    /// by this value so a slow backend degrades to empty context.
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "d_max_retries")]
    pub max_retries: u32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            api_key_env: d_api_key_env(),
            top_k: d_top_k(),
            min_similarity: d_min_similarity(),
            timeout_ms: d_timeout_ms(),
            max_retries: d_max_retries(),
        }
    }
}

fn d_base_url() -> String {
    "http://127.0.0.1:8091".into()
}

fn d_api_key_env() -> String {
    "DOCENT_SEARCH_KEY".into()
}

fn d_top_k() -> usize {
    5
}

fn d_min_similarity() -> f32 {
    0.3
}

fn d_timeout_ms() -> u64 {
    2_500
}

fn d_max_retries() -> u32 {
    2
}
