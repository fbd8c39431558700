//! CV ingestion: hash, dedupe, extract, chunk, embed, upsert, add to session.
//!
//! Documents are keyed by content hash: identical bytes are indexed once and then only
//! attached to further sessions.

use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::embedding::Embedder;
use crate::errors::AppError;
use crate::ingest::chunking::{structural_chunking, ChunkedCv, UNKNOWN_CANDIDATE};
use crate::pdf::{extract_text, file_hash, is_pdf};
use crate::session::SessionCv;
use crate::state::AppState;
use crate::store::{CvPoint, SectionPayload, VectorStore};

/// What happened to one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestOutcome {
    pub file_name: String,
    pub file_hash: Option<String>,
    #[serde(flatten)]
    pub status: IngestStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestStatus {
    /// Newly chunked, embedded and stored.
    Indexed {
        candidate_name: String,
        chunk_count: usize,
        sections: Vec<String>,
    },
    /// Already in the vector index from an earlier upload; only added to this session.
    AlreadyIndexed { candidate_name: String },
    /// Already in this session's scope; nothing changed.
    AlreadyInSession { candidate_name: String },
    Skipped { reason: String },
}

impl IngestOutcome {
    fn new(file_name: &str, file_hash: Option<&str>, status: IngestStatus) -> Self {
        Self {
            file_name: file_name.to_string(),
            file_hash: file_hash.map(str::to_string),
            status,
        }
    }
}

/// Ingests one uploaded file into the session.
pub async fn ingest_upload(
    state: &AppState,
    session_id: Uuid,
    file_name: &str,
    content_type: Option<&str>,
    bytes: Bytes,
) -> Result<IngestOutcome, AppError> {
    if !is_pdf(file_name, content_type) {
        return Ok(IngestOutcome::new(
            file_name,
            None,
            IngestStatus::Skipped {
                reason: "Only PDF files are supported.".to_string(),
            },
        ));
    }

    let hash = file_hash(&bytes);

    if let Some(outcome) = attach_existing(state, session_id, file_name, &hash).await? {
        return Ok(outcome);
    }

    let text = match extract_text(bytes).await {
        Ok(text) => text,
        Err(AppError::UnprocessableEntity(reason)) => {
            warn!("Skipping {file_name}: {reason}");
            return Ok(IngestOutcome::new(
                file_name,
                Some(&hash),
                IngestStatus::Skipped { reason },
            ));
        }
        Err(e) => return Err(e),
    };

    index_text(state, session_id, file_name, &hash, &text).await
}

/// Handles documents already known to the session or to the vector index.
async fn attach_existing(
    state: &AppState,
    session_id: Uuid,
    file_name: &str,
    hash: &str,
) -> Result<Option<IngestOutcome>, AppError> {
    let in_session = state
        .sessions
        .list(session_id)
        .await?
        .into_iter()
        .find(|cv| cv.file_hash == hash);
    if let Some(cv) = in_session {
        return Ok(Some(IngestOutcome::new(
            file_name,
            Some(hash),
            IngestStatus::AlreadyInSession {
                candidate_name: cv.candidate_name,
            },
        )));
    }

    if !state.store.document_exists(hash).await? {
        return Ok(None);
    }

    let candidate_name = state
        .store
        .candidate_for(hash)
        .await?
        .unwrap_or_else(|| UNKNOWN_CANDIDATE.to_string());
    state
        .sessions
        .add(session_id, SessionCv::new(hash, file_name, &candidate_name))
        .await?;
    info!("{file_name} already indexed, added to session {session_id} as {candidate_name}");

    Ok(Some(IngestOutcome::new(
        file_name,
        Some(hash),
        IngestStatus::AlreadyIndexed { candidate_name },
    )))
}

/// Chunks, indexes and attaches already-extracted CV text.
pub async fn index_text(
    state: &AppState,
    session_id: Uuid,
    file_name: &str,
    hash: &str,
    text: &str,
) -> Result<IngestOutcome, AppError> {
    if text.trim().is_empty() {
        warn!("No text extracted from {file_name}");
        return Ok(IngestOutcome::new(
            file_name,
            Some(hash),
            IngestStatus::Skipped {
                reason: format!("Could not extract text from {file_name}."),
            },
        ));
    }

    let chunked = structural_chunking(text, state.llm.as_ref()).await;
    if chunked.chunks.is_empty() {
        return Ok(IngestOutcome::new(
            file_name,
            Some(hash),
            IngestStatus::Skipped {
                reason: format!("No usable content extracted from {file_name}."),
            },
        ));
    }

    let chunk_count =
        index_chunks(state.embedder.as_ref(), state.store.as_ref(), &chunked, hash).await?;
    state
        .sessions
        .add(
            session_id,
            SessionCv::new(hash, file_name, &chunked.candidate_name),
        )
        .await?;

    let sections = chunked.section_names();
    info!(
        "{file_name} indexed as {}: {} section chunk(s): {}",
        chunked.candidate_name,
        chunk_count,
        sections.join(", ")
    );

    Ok(IngestOutcome::new(
        file_name,
        Some(hash),
        IngestStatus::Indexed {
            candidate_name: chunked.candidate_name,
            chunk_count,
            sections,
        },
    ))
}

/// Embeds every chunk in one batch and upserts the resulting points.
pub async fn index_chunks(
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    chunked: &ChunkedCv,
    hash: &str,
) -> Result<usize, AppError> {
    let texts: Vec<&str> = chunked.chunks.iter().map(|c| c.content.as_str()).collect();
    let vectors = embedder.embed(&texts).await?;

    let points: Vec<CvPoint> = chunked
        .chunks
        .iter()
        .zip(vectors)
        .map(|(chunk, vector)| CvPoint {
            id: Uuid::new_v4(),
            vector,
            payload: SectionPayload::new(
                chunk.content.clone(),
                chunk.section.clone(),
                hash,
                &chunked.candidate_name,
            ),
        })
        .collect();

    store.upsert(&points).await?;
    Ok(points.len())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{test_state, ScriptedLlm};

    const CV_TEXT: &str = "Alice Smith. Skills: Rust, Tokio, PostgreSQL, Kubernetes and distributed tracing. \
        Education: MSc Computer Science, University of Lisbon, graduated 2019 with distinction.";

    fn layout_reply() -> String {
        serde_json::json!({
            "candidate_name": "Alice Smith",
            "sections": [
                {"section_title": "Skills", "content": "Rust, Tokio, PostgreSQL, Kubernetes and distributed tracing."},
                {"section_title": "Education", "content": "MSc Computer Science, University of Lisbon, graduated 2019."}
            ]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_index_text_stores_sections_and_attaches_session() {
        let llm = Arc::new(ScriptedLlm::replying(&[&layout_reply()]));
        let state = test_state(llm);
        let session = Uuid::new_v4();

        let outcome = index_text(&state, session, "alice.pdf", "hash-a", CV_TEXT)
            .await
            .unwrap();

        assert_eq!(
            outcome.status,
            IngestStatus::Indexed {
                candidate_name: "Alice Smith".to_string(),
                chunk_count: 2,
                sections: vec!["Skills".to_string(), "Education".to_string()],
            }
        );
        assert_eq!(state.store.point_count().await.unwrap(), 2);
        assert_eq!(
            state.store.candidate_for("hash-a").await.unwrap().as_deref(),
            Some("Alice Smith")
        );

        let cvs = state.sessions.list(session).await.unwrap();
        assert_eq!(cvs.len(), 1);
        assert_eq!(cvs[0].file_name, "alice.pdf");
    }

    #[tokio::test]
    async fn test_blank_text_is_skipped_without_llm_call() {
        let llm = Arc::new(ScriptedLlm::failing());
        let state = test_state(llm.clone());

        let outcome = index_text(&state, Uuid::new_v4(), "scan.pdf", "hash-s", "  \n ")
            .await
            .unwrap();

        assert!(matches!(outcome.status, IngestStatus::Skipped { .. }));
        assert!(llm.requests().is_empty());
        assert_eq!(state.store.point_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_known_document_is_attached_not_reindexed() {
        let llm = Arc::new(ScriptedLlm::replying(&[&layout_reply()]));
        let state = test_state(llm.clone());
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        index_text(&state, first, "alice.pdf", "hash-a", CV_TEXT)
            .await
            .unwrap();

        let outcome = attach_existing(&state, second, "alice-copy.pdf", "hash-a")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            outcome.status,
            IngestStatus::AlreadyIndexed {
                candidate_name: "Alice Smith".to_string()
            }
        );
        assert_eq!(state.store.point_count().await.unwrap(), 2);
        assert_eq!(llm.requests().len(), 1);
        assert!(state.sessions.contains(second, "hash-a").await.unwrap());

        let again = attach_existing(&state, second, "alice-copy.pdf", "hash-a")
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(again.status, IngestStatus::AlreadyInSession { .. }));
    }

    #[tokio::test]
    async fn test_unknown_document_is_not_attached() {
        let state = test_state(Arc::new(ScriptedLlm::failing()));
        let outcome = attach_existing(&state, Uuid::new_v4(), "new.pdf", "hash-new")
            .await
            .unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_non_pdf_upload_is_skipped() {
        let state = test_state(Arc::new(ScriptedLlm::failing()));
        let outcome = ingest_upload(
            &state,
            Uuid::new_v4(),
            "cv.docx",
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
            Bytes::from_static(b"PK\x03\x04"),
        )
        .await
        .unwrap();

        assert!(matches!(outcome.status, IngestStatus::Skipped { .. }));
        assert!(outcome.file_hash.is_none());
    }

    #[tokio::test]
    async fn test_unreadable_pdf_is_skipped() {
        let state = test_state(Arc::new(ScriptedLlm::failing()));
        let outcome = ingest_upload(
            &state,
            Uuid::new_v4(),
            "broken.pdf",
            Some("application/pdf"),
            Bytes::from_static(b"not really a pdf"),
        )
        .await
        .unwrap();

        assert!(matches!(outcome.status, IngestStatus::Skipped { .. }));
        assert!(outcome.file_hash.is_some());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = IngestOutcome::new(
            "alice.pdf",
            Some("abc"),
            IngestStatus::AlreadyIndexed {
                candidate_name: "Alice".to_string(),
            },
        );
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "already_indexed");
        assert_eq!(value["candidate_name"], "Alice");
        assert_eq!(value["file_hash"], "abc");
    }
}
