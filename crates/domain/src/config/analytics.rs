use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Analytics store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Append-only turn-summary endpoint. Unset disables recording.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key_env: d_api_key_env(),
            timeout_ms: d_timeout_ms(),
        }
    }
}

fn d_api_key_env() -> String {
    "DOCENT_ANALYTICS_KEY".into()
}

fn d_timeout_ms() -> u64 {
    1_500
}
