use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Action dispatch backends
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Side-effect dispatch configuration. Every backend is optional: an
/// unconfigured backend degrades the matching action to a "service
/// unavailable" outcome instead of failing the turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionsConfig {
    #[serde(default)]
    pub delivery: Option<DeliveryConfig>,
    #[serde(default)]
    pub notify: Option<NotifyConfig>,
    #[serde(default)]
    pub submissions: Option<SubmissionsConfig>,
    /// Upper bound on any single dispatch call.
    #[serde(default = "d_dispatch_timeout_ms")]
    pub dispatch_timeout_ms: u64,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            delivery: None,
            notify: None,
            submissions: None,
            dispatch_timeout_ms: d_dispatch_timeout_ms(),
        }
    }
}

fn d_dispatch_timeout_ms() -> u64 {
    5_000
}

/// Document delivery service (dossier sending).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    pub base_url: String,
    #[serde(default = "d_delivery_key_env")]
    pub api_key_env: String,
    /// Identifier of the dossier document the delivery service serves.
    #[serde(default = "d_document_id")]
    pub document_id: String,
}

fn d_delivery_key_env() -> String {
    "DOCENT_DELIVERY_KEY".into()
}

fn d_document_id() -> String {
    "profile-dossier".into()
}

/// Operator notification service (contact-request flags).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub base_url: String,
    #[serde(default = "d_notify_key_env")]
    pub api_key_env: String,
}

fn d_notify_key_env() -> String {
    "DOCENT_NOTIFY_KEY".into()
}

/// Anonymized submission log (append-only JSON lines on disk).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionsConfig {
    #[serde(default = "d_submissions_path")]
    pub path: String,
}

impl Default for SubmissionsConfig {
    fn default() -> Self {
        Self {
            path: d_submissions_path(),
        }
    }
}

fn d_submissions_path() -> String {
    "data/submissions.jsonl".into()
}
