//! Turn API endpoint — the primary interface to the pipeline.
//!
//! `POST /v1/turn` runs one conversation turn and returns the answer,
//! source summaries, and action outcomes. The response is always a
//! well-formed JSON object; failures inside the pipeline degrade to
//! user-safe messages rather than error statuses.

use axum::extract::State;
use axum::response::Json;

use docent_domain::state::{TurnRequest, TurnResponse};

use crate::state::AppState;

/// POST /v1/turn
///
/// Turns within one session are serialized in arrival order via the
/// session lock; distinct sessions run concurrently.
pub async fn turn(
    State(state): State<AppState>,
    Json(body): Json<TurnRequest>,
) -> Json<TurnResponse> {
    let _permit = match body.session_id.as_deref() {
        Some(session_id) if !session_id.trim().is_empty() => {
            state.session_locks.acquire(session_id).await
        }
        // A new session gets its id minted inside the pipeline; there
        // is nothing to serialize against yet.
        _ => None,
    };

    let response = state.pipeline.run_turn(body).await;
    Json(response)
}
