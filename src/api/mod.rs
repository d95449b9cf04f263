//! HTTP surface of the QA service.

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use handlers::AppState;

/// Build the service routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Extraction and prompts
        .route("/analyze", post(handlers::analyze))
        .route("/prompt", post(handlers::prompt))
        // Generation
        .route("/generate", post(handlers::generate))
        .route("/generate/batch", post(handlers::generate_batch))
        .with_state(state)
}
