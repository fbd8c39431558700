//! Session scope: which indexed CVs a client is currently asking about.
//!
//! Documents are shared across sessions in the vector index (deduplicated by file hash);
//! a session only records which of them are in scope.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod handlers;
pub mod memory;
pub mod redis_store;

pub use memory::MemorySessionStore;
pub use redis_store::RedisSessionStore;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Corrupt session entry: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// One CV in a session's scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCv {
    pub file_hash: String,
    pub file_name: String,
    pub candidate_name: String,
    pub added_at: DateTime<Utc>,
}

impl SessionCv {
    pub fn new(file_hash: &str, file_name: &str, candidate_name: &str) -> Self {
        Self {
            file_hash: file_hash.to_string(),
            file_name: file_name.to_string(),
            candidate_name: candidate_name.to_string(),
            added_at: Utc::now(),
        }
    }
}

/// Session bookkeeping backend. Carried in `AppState` as `Arc<dyn SessionStore>`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Adds the CV unless its file hash is already in scope. Returns whether it was added.
    async fn add(&self, session_id: Uuid, cv: SessionCv) -> Result<bool, SessionError>;

    /// CVs in insertion order.
    async fn list(&self, session_id: Uuid) -> Result<Vec<SessionCv>, SessionError>;

    async fn contains(&self, session_id: Uuid, file_hash: &str) -> Result<bool, SessionError> {
        Ok(self
            .list(session_id)
            .await?
            .iter()
            .any(|cv| cv.file_hash == file_hash))
    }

    async fn clear(&self, session_id: Uuid) -> Result<(), SessionError>;
}
