pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ingest::handlers as ingest;
use crate::rag::handlers as rag;
use crate::report::handlers as report;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Session scope
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_clear_session),
        )
        // Chat with CVs
        .route("/api/v1/sessions/:id/cvs", post(ingest::handle_upload))
        .route("/api/v1/sessions/:id/ask", post(rag::handle_ask))
        // Strength & weakness report
        .route("/api/v1/reports", post(report::handle_report))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
