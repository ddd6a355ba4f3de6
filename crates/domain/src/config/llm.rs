use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Generation backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Any OpenAI-compatible chat completions endpoint.
    #[serde(default = "d_base_url")]
    pub base_url: String,
    #[serde(default = "d_model")]
    pub model: String,
    /// Environment variable holding the API key. Unset env var means
    /// unauthenticated requests (Ollama, vLLM, LM Studio).
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "d_temperature")]
    pub temperature: f32,
    /// Token budget for standard answers.
    #[serde(default = "d_max_tokens")]
    pub max_tokens: u32,
    /// Token budget when the classifier asks for a longer, multi-section
    /// answer.
    #[serde(default = "d_max_tokens_long")]
    pub max_tokens_long: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            model: d_model(),
            api_key_env: d_api_key_env(),
            timeout_ms: d_timeout_ms(),
            temperature: d_temperature(),
            max_tokens: d_max_tokens(),
            max_tokens_long: d_max_tokens_long(),
        }
    }
}

fn d_base_url() -> String {
    "http://127.0.0.1:11434/v1".into()
}

fn d_model() -> String {
    "gpt-4o-mini".into()
}

fn d_api_key_env() -> String {
    "DOCENT_LLM_KEY".into()
}

fn d_timeout_ms() -> u64 {
    20_000
}

fn d_temperature() -> f32 {
    0.3
}

fn d_max_tokens() -> u32 {
    600
}

fn d_max_tokens_long() -> u32 {
    1_400
}
