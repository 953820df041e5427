//! API routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{self, AppState};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health))

        // Chain watcher
        .route("/api/v1/chainwatch/status", get(handlers::status))
        .route("/api/v1/chainwatch/enable", post(handlers::enable))
        .route("/api/v1/chainwatch/disable", post(handlers::disable))
        .route(
            "/api/v1/chainwatch/threshold",
            get(handlers::get_threshold).post(handlers::set_threshold),
        )

        .with_state(state)
}
