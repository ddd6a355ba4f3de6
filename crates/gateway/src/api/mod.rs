pub mod health;
pub mod turn;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the caller-facing router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/turn", post(turn::turn))
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
