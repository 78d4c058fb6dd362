pub mod health;

use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};

use crate::audit::handlers as contracts;
use crate::extraction::handlers as documents;
use crate::screening::handlers as screening;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Contract API
        .route("/api/v1/contracts/audit", post(contracts::handle_audit))
        .route("/api/v1/contracts/render", post(contracts::handle_render))
        .route("/api/v1/contracts/apply", post(contracts::handle_apply))
        .route("/api/v1/contracts/apply-all", post(contracts::handle_apply_all))
        // Screening API
        .route("/api/v1/screening/evaluate", post(screening::handle_evaluate))
        .route(
            "/api/v1/screening/evaluate-upload",
            post(screening::handle_evaluate_upload),
        )
        .route(
            "/api/v1/screening/interview-questions",
            post(screening::handle_interview_questions),
        )
        // Documents API
        .route("/api/v1/documents/extract", post(documents::handle_extract))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
