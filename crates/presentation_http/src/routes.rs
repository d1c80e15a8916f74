//! Route definitions

use axum::{
    Router,
    routing::{get, post},
};

use crate::{handlers, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // Moderation API (v1)
        .route("/v1/moderation/check", post(handlers::moderation::check))
        // Diff and analysis API (v1)
        .route("/v1/diff", post(handlers::diff::compare))
        .route(
            "/v1/stages/{stage_id}/diff/previous",
            get(handlers::diff::compare_with_previous),
        )
        .route("/v1/analysis", post(handlers::analysis::analyze))
        .with_state(state)
}
