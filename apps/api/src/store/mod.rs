//! Vector storage for CV sections.
//!
//! Every point carries a payload identifying the document (`file_hash`) and the candidate,
//! so retrieval can be scoped to a session's documents and optionally to named candidates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod qdrant;

pub use memory::MemoryStore;
pub use qdrant::QdrantStore;

/// Payload fields that get a keyword index in the collection.
pub const INDEXED_FIELDS: [&str; 4] = ["file_hash", "candidate_name", "candidate_name_lower", "section"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Qdrant error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("vector has dimension {actual}, collection expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Payload stored alongside every section vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionPayload {
    pub content: String,
    pub section: String,
    pub file_hash: String,
    pub candidate_name: String,
    /// Lowercased and trimmed for case-insensitive candidate filtering.
    pub candidate_name_lower: String,
}

impl SectionPayload {
    pub fn new(content: String, section: String, file_hash: &str, candidate_name: &str) -> Self {
        Self {
            content,
            section,
            file_hash: file_hash.to_string(),
            candidate_name: candidate_name.to_string(),
            candidate_name_lower: normalize_candidate(candidate_name),
        }
    }
}

/// One point ready for upsert.
#[derive(Debug, Clone)]
pub struct CvPoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: SectionPayload,
}

/// A section returned from similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedSection {
    pub content: String,
    pub candidate_name: String,
    pub section: String,
    pub score: f32,
}

/// Conjunctive payload filter. Each present condition matches any of its values.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub file_hashes: Vec<String>,
    /// Already normalized with [`normalize_candidate`].
    pub candidate_names_lower: Option<Vec<String>>,
}

impl SearchFilter {
    pub fn for_files(file_hashes: Vec<String>) -> Self {
        Self {
            file_hashes,
            candidate_names_lower: None,
        }
    }

    pub fn with_candidates(mut self, names: &[String]) -> Self {
        if !names.is_empty() {
            self.candidate_names_lower = Some(names.iter().map(|n| normalize_candidate(n)).collect());
        }
        self
    }

    pub fn matches(&self, payload: &SectionPayload) -> bool {
        if !self.file_hashes.iter().any(|h| h == &payload.file_hash) {
            return false;
        }
        match &self.candidate_names_lower {
            Some(names) => names.iter().any(|n| n == &payload.candidate_name_lower),
            None => true,
        }
    }
}

pub fn normalize_candidate(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Vector index backend. Carried in `AppState` as `Arc<dyn VectorStore>`.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Creates the collection and payload indexes if missing.
    async fn ensure_collection(&self) -> Result<(), StoreError>;

    async fn upsert(&self, points: &[CvPoint]) -> Result<(), StoreError>;

    async fn document_exists(&self, file_hash: &str) -> Result<bool, StoreError>;

    /// Candidate name stored with any point of the document.
    async fn candidate_for(&self, file_hash: &str) -> Result<Option<String>, StoreError>;

    /// Most similar sections first, at most `limit`.
    async fn search(
        &self,
        vector: &[f32],
        filter: &SearchFilter,
        limit: usize,
    ) -> Result<Vec<RetrievedSection>, StoreError>;

    async fn point_count(&self) -> Result<u64, StoreError>;
}
