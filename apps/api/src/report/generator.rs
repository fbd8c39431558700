//! Strength/weakness report: compares a CV with a job description via the LLM.

use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::{language_instruction, render, GROUNDING_INSTRUCTION};
use crate::llm_client::{ChatModel, ChatRequest};
use crate::report::prompts::{REPORT_PROMPT_TEMPLATE, REPORT_SYSTEM};

/// Characters of CV text included in the report prompt.
pub const MAX_REPORT_CV_CHARS: usize = 7000;
const REPORT_TEMPERATURE: f32 = 0.2;

/// Generates a markdown evaluation report: match summary, strengths, gaps,
/// missing keywords and an estimated 0–100% match score.
pub async fn generate_strength_report(
    cv_text: &str,
    job_description: &str,
    llm: &dyn ChatModel,
) -> Result<String, AppError> {
    let request = ChatRequest::new(build_report_prompt(cv_text, job_description))
        .with_system(REPORT_SYSTEM)
        .with_temperature(REPORT_TEMPERATURE);

    let report = llm.complete(&request).await?;
    info!("Generated strength report ({} chars)", report.len());
    Ok(report)
}

pub fn build_report_prompt(cv_text: &str, job_description: &str) -> String {
    let cv_excerpt: String = cv_text.chars().take(MAX_REPORT_CV_CHARS).collect();
    let language = language_instruction("Job Description");
    render(
        REPORT_PROMPT_TEMPLATE,
        &[
            ("grounding_instruction", GROUNDING_INSTRUCTION),
            ("language_instruction", language.as_str()),
            ("job_description", job_description.trim()),
            ("cv_text", cv_excerpt.as_str()),
        ],
    )
}
