use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{SessionCv, SessionError, SessionStore};

/// Process-local sessions. Used when `REDIS_URL` is unset and in tests.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Vec<SessionCv>>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn add(&self, session_id: Uuid, cv: SessionCv) -> Result<bool, SessionError> {
        let mut sessions = self.sessions.write().await;
        let cvs = sessions.entry(session_id).or_default();
        if cvs.iter().any(|existing| existing.file_hash == cv.file_hash) {
            return Ok(false);
        }
        cvs.push(cv);
        Ok(true)
    }

    async fn list(&self, session_id: Uuid) -> Result<Vec<SessionCv>, SessionError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&session_id).cloned().unwrap_or_default())
    }

    async fn clear(&self, session_id: Uuid) -> Result<(), SessionError> {
        self.sessions.write().await.remove(&session_id);
        Ok(())
    }
}
