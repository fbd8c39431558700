//! Axum route handlers for the CV Strength & Weakness Report.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;

use crate::errors::AppError;
use crate::pdf::{extract_text, is_pdf};
use crate::report::generator::generate_strength_report;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    /// Markdown report.
    pub report: String,
    pub model: String,
}

/// Validated report form.
#[derive(Debug, Default)]
struct ReportForm {
    cv: Option<(String, Option<String>, Bytes)>,
    job_description: String,
}

async fn read_form(mut multipart: Multipart) -> Result<ReportForm, AppError> {
    let mut form = ReportForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("cv") => {
                let file_name = field.file_name().unwrap_or("cv.pdf").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    form.cv = Some((file_name, content_type, bytes));
                }
            }
            Some("job_description") => form.job_description = field.text().await?,
            _ => {}
        }
    }
    Ok(form)
}

/// POST /api/v1/reports
///
/// Multipart form: `cv` (PDF file) and `job_description` (text).
pub async fn handle_report(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ReportResponse>, AppError> {
    let form = read_form(multipart).await?;

    let Some((file_name, content_type, bytes)) = form.cv else {
        return Err(AppError::Validation("Please upload a CV.".to_string()));
    };
    if form.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Please paste the job description.".to_string(),
        ));
    }
    if !is_pdf(&file_name, content_type.as_deref()) {
        return Err(AppError::Validation(
            "The CV must be a PDF file.".to_string(),
        ));
    }

    let cv_text = extract_text(bytes).await?;
    let response = report_from_text(&state, &cv_text, &form.job_description).await?;
    Ok(Json(response))
}

/// Generates the report for already-extracted CV text.
pub async fn report_from_text(
    state: &AppState,
    cv_text: &str,
    job_description: &str,
) -> Result<ReportResponse, AppError> {
    if cv_text.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Could not extract text from CV.".to_string(),
        ));
    }

    let report = generate_strength_report(cv_text, job_description, state.llm.as_ref()).await?;

    Ok(ReportResponse {
        report,
        model: state.llm.model_name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{http::StatusCode, response::IntoResponse};

    use super::*;
    use crate::testing::{test_state, ScriptedLlm};

    const JD: &str = "Senior Rust Engineer. Required: Rust, Kubernetes.";

    #[tokio::test]
    async fn test_blank_cv_text_is_unprocessable() {
        let llm = Arc::new(ScriptedLlm::failing());
        let state = test_state(llm.clone());

        let err = report_from_text(&state, " \n\t ", JD).await.unwrap_err();

        assert!(matches!(&err, AppError::UnprocessableEntity(msg) if msg == "Could not extract text from CV."));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_report_response_shape() {
        let llm = Arc::new(ScriptedLlm::replying(&["## Overall Match Summary\nStrong fit."]));
        let state = test_state(llm.clone());

        let response = report_from_text(&state, "Jane Doe. Rust, Kubernetes.", JD)
            .await
            .unwrap();

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["report"], "## Overall Match Summary\nStrong fit.");
        assert_eq!(json["model"], "scripted");
        assert_eq!(json.as_object().unwrap().len(), 2);
        assert!(llm.requests()[0].prompt.contains("Jane Doe. Rust, Kubernetes."));
    }

    #[tokio::test]
    async fn test_llm_failure_is_bad_gateway() {
        let state = test_state(Arc::new(ScriptedLlm::failing()));
        let err = report_from_text(&state, "Jane Doe. Rust.", JD).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
