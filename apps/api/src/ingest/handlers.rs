//! Axum route handlers for CV upload.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::AppPath;
use crate::ingest::pipeline::{ingest_upload, IngestOutcome};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub session_id: Uuid,
    pub outcomes: Vec<IngestOutcome>,
    pub cvs_in_scope: usize,
}

/// POST /api/v1/sessions/:id/cvs
///
/// Multipart upload of one or more CV PDFs. Every part with a file name is ingested;
/// each gets its own outcome, so one unreadable file does not fail the batch.
pub async fn handle_upload(
    State(state): State<AppState>,
    AppPath(session_id): AppPath<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut outcomes = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes: Bytes = field.bytes().await?;

        let outcome =
            ingest_upload(&state, session_id, &file_name, content_type.as_deref(), bytes).await?;
        outcomes.push(outcome);
    }

    if outcomes.is_empty() {
        return Err(AppError::Validation(
            "Select one or more CV PDFs to upload".to_string(),
        ));
    }

    let cvs_in_scope = state.sessions.list(session_id).await?.len();

    Ok(Json(UploadResponse {
        session_id,
        outcomes,
        cvs_in_scope,
    }))
}
