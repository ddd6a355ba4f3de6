//! Telemetry sink: turn summaries for the analytics collaborator.
//!
//! Recording is strictly best-effort. Any failure writing telemetry is
//! logged internally and swallowed; it never raises back into the
//! pipeline or alters the response already produced for the user.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;

use docent_domain::config::AnalyticsConfig;
use docent_domain::error::{Error, Result};
use docent_domain::state::ConversationState;
use docent_domain::trace::TraceEvent;

use crate::policy;
use crate::redact::redacted_excerpt;

/// Upper bound on the redacted query excerpt in a summary.
const QUERY_EXCERPT_CHARS: usize = 160;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Turn summary
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One action in a summary: kind and outcome only, never parameters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSummary {
    pub kind: String,
    pub outcome: String,
}

/// POST /api/turns — append-only turn summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnSummary {
    /// Session correlation id; omitted for the anonymous persona.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    pub turn_id: String,
    pub role: String,
    pub latency_ms: u64,
    pub intent: String,
    pub needs_longer_response: bool,
    pub code_display_requested: bool,
    pub data_display_requested: bool,
    pub vocabulary_version: u32,
    /// Similarity scores of the retrieved chunks, descending.
    pub similarity_scores: Vec<f32>,
    /// Redacted, bounded query text; omitted for the anonymous persona.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_excerpt: Option<String>,
    pub actions: Vec<ActionSummary>,
}

impl TurnSummary {
    /// Build a summary from the final state, applying the role's
    /// telemetry policy and PII redaction.
    pub fn from_state(state: &ConversationState, latency_ms: u64) -> Self {
        let identity_ok = policy::telemetry_identity_permitted(state.role);

        let classification = state.classification;
        let (intent, needs_longer, code_req, data_req, vocab) = match classification {
            Some(c) => (
                c.intent.as_str().to_owned(),
                c.needs_longer_response,
                c.code_display_requested,
                c.data_display_requested,
                c.vocabulary_version,
            ),
            None => ("other".to_owned(), false, false, false, 0),
        };

        Self {
            session: identity_ok.then(|| state.session_id.clone()),
            turn_id: state.turn_id.to_string(),
            role: state.role.as_str().to_owned(),
            latency_ms,
            intent,
            needs_longer_response: needs_longer,
            code_display_requested: code_req,
            data_display_requested: data_req,
            vocabulary_version: vocab,
            similarity_scores: state.context.iter().map(|c| c.similarity).collect(),
            query_excerpt: identity_ok
                .then(|| redacted_excerpt(&state.query, QUERY_EXCERPT_CHARS)),
            actions: state
                .executed_actions
                .iter()
                .map(|e| ActionSummary {
                    kind: e.descriptor.kind.as_str().to_owned(),
                    outcome: e.outcome.as_str().to_owned(),
                })
                .collect(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sink trait + REST impl
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Abstraction over the analytics store (REST, or a test double).
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record(&self, summary: &TurnSummary) -> Result<()>;
}

/// Append-only REST analytics client.
pub struct RestAnalyticsSink {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestAnalyticsSink {
    pub fn new(base_url: &str, cfg: &AnalyticsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: std::env::var(&cfg.api_key_env).ok(),
        })
    }
}

#[async_trait]
impl AnalyticsSink for RestAnalyticsSink {
    async fn record(&self, summary: &TurnSummary) -> Result<()> {
        let url = format!("{}/api/turns", self.base_url);

        let mut rb = self.http.post(&url).json(summary);
        if let Some(ref key) = self.api_key {
            rb = rb.header("X-Api-Key", key);
        }

        let resp = rb
            .send()
            .await
            .map_err(|e| Error::Http(format!("analytics: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Backend {
                name: "analytics".into(),
                message: format!("HTTP {status}"),
            });
        }
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Telemetry facade
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The pipeline's recording stage. Holds an optional sink: with no
/// analytics backend configured the stage still runs and produces an
/// empty result.
pub struct Telemetry {
    sink: Option<Arc<dyn AnalyticsSink>>,
}

impl Telemetry {
    pub fn new(sink: Option<Arc<dyn AnalyticsSink>>) -> Self {
        Self { sink }
    }

    /// Record the turn. Never fails; sink errors are logged and dropped.
    pub async fn record(&self, state: &ConversationState, latency_ms: u64) {
        let Some(sink) = &self.sink else {
            tracing::debug!("analytics sink not configured; skipping turn summary");
            return;
        };

        let summary = TurnSummary::from_state(state, latency_ms);
        let start = Instant::now();
        match sink.record(&summary).await {
            Ok(()) => {
                TraceEvent::TelemetryWrite {
                    ok: true,
                    duration_ms: start.elapsed().as_millis() as u64,
                }
                .emit();
            }
            Err(e) => {
                TraceEvent::TelemetryWrite {
                    ok: false,
                    duration_ms: start.elapsed().as_millis() as u64,
                }
                .emit();
                tracing::warn!(error = %e, "turn summary write failed");
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use docent_domain::role::Role;
    use docent_domain::state::{
        ActionDescriptor, ActionKind, ActionOutcome, Chunk, ConversationState, ExecutedAction,
    };

    fn state_with(role: Role, query: &str) -> ConversationState {
        let mut state = ConversationState::new(query, role, "session-1", Vec::new());
        state.classification = Some(crate::classify::classify(query, role, &[]));
        state
    }

    #[test]
    fn summary_redacts_pii_in_query_excerpt() {
        let state = state_with(Role::Recruiter, "email me at jane@example.com");
        let summary = TurnSummary::from_state(&state, 42);

        let excerpt = summary.query_excerpt.unwrap();
        assert!(excerpt.contains("<EMAIL>"));
        assert!(!excerpt.contains("jane@example.com"));
    }

    #[test]
    fn anonymous_summary_has_no_identity_and_no_query() {
        let mut state = state_with(Role::Anonymous, "something I want kept private");
        state.executed_actions.push(ExecutedAction {
            descriptor: ActionDescriptor {
                kind: ActionKind::LogSubmission,
                params: serde_json::json!({ "category": "other", "content_chars": 29 }),
                reason: "anonymous submission persona".into(),
            },
            outcome: ActionOutcome::Success,
            detail: "submission logged".into(),
        });

        let summary = TurnSummary::from_state(&state, 10);
        assert!(summary.session.is_none());
        assert!(summary.query_excerpt.is_none());

        // Serialized form carries no fragment of the submission.
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("private"));
        assert!(!json.contains("session-1"));
    }

    #[test]
    fn summary_actions_carry_kind_and_outcome_only() {
        let mut state = state_with(Role::Recruiter, "send me the resume");
        state.executed_actions.push(ExecutedAction {
            descriptor: ActionDescriptor {
                kind: ActionKind::SendDocument,
                params: serde_json::json!({ "recipient": "session" }),
                reason: "document request phrasing".into(),
            },
            outcome: ActionOutcome::Failure,
            detail: "service unavailable".into(),
        });

        let summary = TurnSummary::from_state(&state, 5);
        assert_eq!(summary.actions.len(), 1);
        assert_eq!(summary.actions[0].kind, "send_document");
        assert_eq!(summary.actions[0].outcome, "failure");

        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("recipient"));
    }

    #[test]
    fn summary_keeps_similarity_scores() {
        let mut state = state_with(Role::Visitor, "what are your skills");
        state.context = vec![
            Chunk::validated("a", "skills", "text", 0.9).unwrap(),
            Chunk::validated("b", "skills", "text", 0.5).unwrap(),
        ];
        let summary = TurnSummary::from_state(&state, 5);
        assert_eq!(summary.similarity_scores, vec![0.9, 0.5]);
    }
}
