//! Axum route handlers for question answering.

use axum::{extract::State, Json};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::rag::ask::{ask, AskRequest, AskResponse};
use crate::state::AppState;

/// POST /api/v1/sessions/:id/ask
///
/// Answers a question strictly from the CVs in the session's scope.
pub async fn handle_ask(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
    AppJson(request): AppJson<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let response = ask(&state, session_id, &request.question).await?;
    Ok(Json(response))
}
