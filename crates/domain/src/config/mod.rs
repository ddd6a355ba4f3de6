mod actions;
mod analytics;
mod conversation;
mod llm;
mod retrieval;
mod server;

pub use actions::*;
pub use analytics::*;
pub use conversation::*;
pub use llm::*;
pub use retrieval::*;
pub use server::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub actions: ActionsConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut issues = Vec::new();

        let mut err = |field: &str, message: String| {
            issues.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: field.to_owned(),
                message,
            });
        };

        if self.server.port == 0 {
            err("server.port", "port must be non-zero".into());
        }
        if self.retrieval.top_k == 0 {
            err("retrieval.top_k", "top_k must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.retrieval.min_similarity) {
            err(
                "retrieval.min_similarity",
                format!(
                    "must be within [0.0, 1.0], got {}",
                    self.retrieval.min_similarity
                ),
            );
        }
        if self.retrieval.timeout_ms == 0 {
            err("retrieval.timeout_ms", "timeout must be non-zero".into());
        }
        if self.llm.timeout_ms == 0 {
            err("llm.timeout_ms", "timeout must be non-zero".into());
        }
        if self.llm.model.trim().is_empty() {
            err("llm.model", "model name must not be empty".into());
        }
        if self.actions.dispatch_timeout_ms == 0 {
            err(
                "actions.dispatch_timeout_ms",
                "timeout must be non-zero".into(),
            );
        }
        if self.conversation.max_history_turns == 0 {
            err(
                "conversation.max_history_turns",
                "history must keep at least one turn".into(),
            );
        }
        if self.conversation.max_query_chars == 0 {
            err(
                "conversation.max_query_chars",
                "query limit must be non-zero".into(),
            );
        }

        // Warnings: optional backends left unconfigured still boot, but the
        // matching actions will report "service unavailable".
        let mut warn = |field: &str, message: String| {
            issues.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: field.to_owned(),
                message,
            });
        };
        if self.actions.delivery.is_none() {
            warn(
                "actions.delivery",
                "not configured; send_document actions will fail as unavailable".into(),
            );
        }
        if self.actions.notify.is_none() {
            warn(
                "actions.notify",
                "not configured; flag_contact actions will fail as unavailable".into(),
            );
        }
        if self.analytics.base_url.is_none() {
            warn(
                "analytics.base_url",
                "not configured; turn summaries will not be recorded".into(),
            );
        }

        issues
    }
}
