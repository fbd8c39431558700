//! Ask pipeline: orchestrates one question against a session.
//!
//! The question is validated and screened first. Candidates named in it narrow the
//! retrieval, and the answer is composed from whatever sections come back.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::rag::answer::generate_answer;
use crate::rag::guard::{is_suspicious, REFUSAL};
use crate::rag::retrieval::{mentioned_candidates, retrieve};
use crate::state::AppState;
use crate::store::RetrievedSection;

/// Characters of each source excerpt echoed back to the client.
pub const EXCERPT_PREVIEW_CHARS: usize = 300;

pub const NO_RELEVANT_INFO: &str =
    "No relevant information found for this query in the uploaded CVs.";

#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceExcerpt {
    pub candidate_name: String,
    pub section: String,
    pub excerpt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub refused: bool,
    /// Candidates the question was narrowed to; empty means all in scope.
    pub filtered_candidates: Vec<String>,
    pub sources: Vec<SourceExcerpt>,
}

impl AskResponse {
    fn without_sources(answer: &str, refused: bool, filtered_candidates: Vec<String>) -> Self {
        Self {
            answer: answer.to_string(),
            refused,
            filtered_candidates,
            sources: vec![],
        }
    }
}

/// Answers one question using only the CVs in the session's scope.
pub async fn ask(state: &AppState, session_id: Uuid, question: &str) -> Result<AskResponse, AppError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::Validation("question cannot be empty".to_string()));
    }

    let cvs = state.sessions.list(session_id).await?;
    if cvs.is_empty() {
        return Err(AppError::Validation(
            "Please upload at least one CV first.".to_string(),
        ));
    }

    if is_suspicious(question) {
        info!("Session {session_id}: question refused by guard");
        return Ok(AskResponse::without_sources(REFUSAL, true, vec![]));
    }

    let filtered_candidates = mentioned_candidates(question, &cvs);
    let file_hashes: Vec<String> = cvs.iter().map(|cv| cv.file_hash.clone()).collect();

    let contexts = retrieve(
        state.embedder.as_ref(),
        state.store.as_ref(),
        question,
        &file_hashes,
        &filtered_candidates,
        state.config.retrieval_top_k,
    )
    .await?;

    if contexts.is_empty() {
        return Ok(AskResponse::without_sources(
            NO_RELEVANT_INFO,
            false,
            filtered_candidates,
        ));
    }

    let candidates_in_scope: Vec<String> = cvs.iter().map(|cv| cv.candidate_name.clone()).collect();
    let answer = generate_answer(question, &contexts, &candidates_in_scope, state.llm.as_ref()).await?;

    Ok(AskResponse {
        answer: answer.text,
        refused: answer.refused,
        filtered_candidates,
        sources: contexts.iter().map(source_excerpt).collect(),
    })
}

fn source_excerpt(section: &RetrievedSection) -> SourceExcerpt {
    SourceExcerpt {
        candidate_name: section.candidate_name.clone(),
        section: section.section.clone(),
        excerpt: preview(&section.content, EXCERPT_PREVIEW_CHARS),
    }
}

/// First `max_chars` characters, with an ellipsis when truncated.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
