use serde::Serialize;

/// Structured trace events emitted across all Docent crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SearchCall {
        endpoint: String,
        status: u16,
        duration_ms: u64,
    },
    SearchDegraded {
        reason: String,
    },
    LlmRequest {
        model: String,
        duration_ms: u64,
        fallback: bool,
    },
    ActionDispatched {
        kind: String,
        outcome: String,
        duration_ms: u64,
    },
    DispatchSuppressed {
        kind: String,
    },
    TelemetryWrite {
        ok: bool,
        duration_ms: u64,
    },
    SessionResolved {
        session_id: String,
        is_new: bool,
    },
    TurnRejected {
        reason: String,
    },
    TurnCompleted {
        session_id: String,
        turn_id: String,
        role: String,
        latency_ms: u64,
        context_chunks: usize,
        actions_executed: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "docent_event");
    }
}
