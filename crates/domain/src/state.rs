//! Conversation-state types threaded through the pipeline.
//!
//! A [`ConversationState`] is created per inbound turn, flows through the
//! stages exactly once, and is never shared across turns. Each stage fills
//! in only the fields it owns; earlier fields are read-only downstream.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// History
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// One entry of the bounded per-session history buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl HistoryEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self { speaker: Speaker::User, text: text.into() }
    }
    pub fn assistant(text: impl Into<String>) -> Self {
        Self { speaker: Speaker::Assistant, text: text.into() }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Classification signals
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Closed intent set. Ties between matched categories resolve by the
/// fixed priority ActionRequest > DataRequest > CodeRequest >
/// Informational > Other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Informational,
    DataRequest,
    CodeRequest,
    ActionRequest,
    Other,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Informational => "informational",
            Intent::DataRequest => "data_request",
            Intent::CodeRequest => "code_request",
            Intent::ActionRequest => "action_request",
            Intent::Other => "other",
        }
    }
}

/// Signals produced once per turn by the classifier; read-only downstream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    pub needs_longer_response: bool,
    pub code_display_requested: bool,
    pub data_display_requested: bool,
    /// Version of the vocabulary table that produced these signals.
    pub vocabulary_version: u32,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Retrieved context
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A retrieved unit of profile content with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub source_id: String,
    pub section: String,
    pub text: String,
    /// Always within `[0.0, 1.0]`; enforced by [`Chunk::validated`].
    pub similarity: f32,
}

impl Chunk {
    /// Build a chunk, rejecting out-of-range or non-finite similarity.
    pub fn validated(
        source_id: impl Into<String>,
        section: impl Into<String>,
        text: impl Into<String>,
        similarity: f32,
    ) -> Option<Self> {
        if !similarity.is_finite() || !(0.0..=1.0).contains(&similarity) {
            return None;
        }
        Some(Self {
            source_id: source_id.into(),
            section: section.into(),
            text: text.into(),
            similarity,
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Actions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Closed set of side-effect kinds the planner may emit. "No action" is
/// the empty plan list, not a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    SendDocument,
    FlagContact,
    LogSubmission,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::SendDocument => "send_document",
            ActionKind::FlagContact => "flag_contact",
            ActionKind::LogSubmission => "log_submission",
        }
    }
}

/// A declarative record of a candidate side effect, prior to execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub kind: ActionKind,
    /// Parameters the executor needs, JSON-shaped so the policy gate can
    /// redact fields without knowing every kind's schema.
    pub params: serde_json::Value,
    /// Why the planner considered this action eligible.
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionOutcome {
    Success,
    Failure,
}

impl ActionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionOutcome::Success => "success",
            ActionOutcome::Failure => "failure",
        }
    }
}

/// An executed (or suppressed) action with its outcome. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutedAction {
    pub descriptor: ActionDescriptor,
    pub outcome: ActionOutcome,
    pub detail: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ConversationState
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The single value threaded through the pipeline for one turn.
#[derive(Debug, Clone)]
pub struct ConversationState {
    /// Current user utterance; immutable once set for a turn.
    pub query: String,
    pub role: Role,
    /// Opaque correlation id, created once per client session.
    pub session_id: String,
    /// Minted per turn; keys action-dispatch idempotency.
    pub turn_id: Uuid,
    /// Snapshot of the bounded session history at turn start.
    pub history: Vec<HistoryEntry>,
    pub classification: Option<Classification>,
    /// Ordered by descending similarity; may be empty.
    pub context: Vec<Chunk>,
    pub answer: Option<String>,
    /// Post-gate plan: only actions the role policy allowed.
    pub planned_actions: Vec<ActionDescriptor>,
    pub executed_actions: Vec<ExecutedAction>,
}

impl ConversationState {
    pub fn new(
        query: impl Into<String>,
        role: Role,
        session_id: impl Into<String>,
        history: Vec<HistoryEntry>,
    ) -> Self {
        Self {
            query: query.into(),
            role,
            session_id: session_id.into(),
            turn_id: Uuid::new_v4(),
            history,
            classification: None,
            context: Vec::new(),
            answer: None,
            planned_actions: Vec::new(),
            executed_actions: Vec::new(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Caller-facing turn API
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Input to one turn of the pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct TurnRequest {
    pub query: String,
    #[serde(default)]
    pub role: Role,
    /// Absent for a new session; the pipeline mints one.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Optional seed history for sessions this process has not seen.
    /// Ignored when the session is already tracked server-side.
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
}

/// Compact view of a context chunk returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSummary {
    pub source_id: String,
    pub section: String,
    pub similarity: f32,
}

impl From<&Chunk> for SourceSummary {
    fn from(c: &Chunk) -> Self {
        Self {
            source_id: c.source_id.clone(),
            section: c.section.clone(),
            similarity: c.similarity,
        }
    }
}

/// Outcome of one action as returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionReport {
    pub kind: ActionKind,
    pub outcome: ActionOutcome,
    pub detail: String,
}

impl From<&ExecutedAction> for ActionReport {
    fn from(e: &ExecutedAction) -> Self {
        Self {
            kind: e.descriptor.kind,
            outcome: e.outcome,
            detail: e.detail.clone(),
        }
    }
}

/// Output of one turn. Always well-formed, even on degraded paths.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub answer: String,
    pub session_id: String,
    pub sources: Vec<SourceSummary>,
    pub actions: Vec<ActionReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_validated_accepts_unit_range() {
        assert!(Chunk::validated("p", "s", "t", 0.0).is_some());
        assert!(Chunk::validated("p", "s", "t", 1.0).is_some());
        assert!(Chunk::validated("p", "s", "t", 0.5).is_some());
    }

    #[test]
    fn chunk_validated_rejects_out_of_range() {
        assert!(Chunk::validated("p", "s", "t", -0.01).is_none());
        assert!(Chunk::validated("p", "s", "t", 1.01).is_none());
        assert!(Chunk::validated("p", "s", "t", f32::NAN).is_none());
        assert!(Chunk::validated("p", "s", "t", f32::INFINITY).is_none());
    }

    #[test]
    fn new_state_starts_with_empty_stage_outputs() {
        let state = ConversationState::new("hi", Role::Visitor, "s-1", Vec::new());
        assert!(state.classification.is_none());
        assert!(state.context.is_empty());
        assert!(state.answer.is_none());
        assert!(state.planned_actions.is_empty());
        assert!(state.executed_actions.is_empty());
    }

    #[test]
    fn turn_request_defaults_role_to_visitor() {
        let req: TurnRequest = serde_json::from_str(r#"{"query":"hello"}"#).unwrap();
        assert_eq!(req.role, Role::Visitor);
        assert!(req.session_id.is_none());
    }
}
