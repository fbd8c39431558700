//! Retrieval: session-scoped vector search with optional candidate narrowing.

use tracing::debug;

use crate::embedding::Embedder;
use crate::errors::AppError;
use crate::session::SessionCv;
use crate::store::{RetrievedSection, SearchFilter, VectorStore};

/// Placeholder names that must never be treated as a mention.
const IGNORED_NAMES: [&str; 2] = ["unknown", "existing"];

/// Candidates in scope whose name is mentioned in the question.
///
/// A candidate matches when the full name appears in the question, or when any part of
/// the name (two characters or longer) is one of the question's words. Order follows the
/// session, duplicates are dropped.
pub fn mentioned_candidates(query: &str, cvs: &[SessionCv]) -> Vec<String> {
    let query_lower = query.to_lowercase();
    let words: Vec<&str> = query_lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let mut mentioned: Vec<String> = Vec::new();
    for cv in cvs {
        let name = cv.candidate_name.trim();
        let name_lower = name.to_lowercase();
        if name.is_empty() || IGNORED_NAMES.contains(&name_lower.as_str()) {
            continue;
        }

        let full_match = query_lower.contains(&name_lower);
        let part_match = name_lower
            .split_whitespace()
            .filter(|part| part.chars().count() >= 2)
            .any(|part| words.contains(&part));

        if (full_match || part_match) && !mentioned.iter().any(|m| m == name) {
            mentioned.push(name.to_string());
        }
    }
    mentioned
}

/// Retrieves the sections most relevant to `query`, strictly limited to:
/// 1. the session's documents (`file_hashes`, always applied), and
/// 2. the named candidates, when any are given.
pub async fn retrieve(
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    query: &str,
    file_hashes: &[String],
    candidate_names: &[String],
    top_k: usize,
) -> Result<Vec<RetrievedSection>, AppError> {
    if file_hashes.is_empty() {
        return Ok(Vec::new());
    }

    let vector = embedder.embed_query(query).await?;
    let filter = SearchFilter::for_files(file_hashes.to_vec()).with_candidates(candidate_names);
    let sections = store.search(&vector, &filter, top_k).await?;

    debug!(
        "Retrieved {} sections from {} documents (candidates: {:?})",
        sections.len(),
        file_hashes.len(),
        candidate_names
    );
    Ok(sections)
}
