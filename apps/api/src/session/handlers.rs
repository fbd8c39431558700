//! Axum route handlers for session scope.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::AppPath;
use crate::session::SessionCv;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SessionDetail {
    pub session_id: Uuid,
    pub cv_count: usize,
    pub cvs: Vec<SessionCv>,
}

/// POST /api/v1/sessions
pub async fn handle_create_session() -> (StatusCode, Json<SessionCreated>) {
    (
        StatusCode::CREATED,
        Json(SessionCreated {
            session_id: Uuid::new_v4(),
        }),
    )
}

/// GET /api/v1/sessions/:id
///
/// Lists the CVs in scope. An unknown session is simply empty.
pub async fn handle_get_session(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
) -> Result<Json<SessionDetail>, AppError> {
    let cvs = state.sessions.list(session_id).await?;
    Ok(Json(SessionDetail {
        session_id,
        cv_count: cvs.len(),
        cvs,
    }))
}

/// DELETE /api/v1/sessions/:id
///
/// Clears the session scope. Indexed documents stay in the vector index.
pub async fn handle_clear_session(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.clear(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
