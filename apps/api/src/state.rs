use std::sync::Arc;

use crate::config::Config;
use crate::embedding::Embedder;
use crate::llm_client::ChatModel;
use crate::session::SessionStore;
use crate::store::VectorStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Chat model used for section chunking, answers and reports.
    pub llm: Arc<dyn ChatModel>,
    pub embedder: Arc<dyn Embedder>,
    /// Qdrant in production; in-memory when `QDRANT_URL` is unset.
    pub store: Arc<dyn VectorStore>,
    /// Redis in production; in-memory when `REDIS_URL` is unset.
    pub sessions: Arc<dyn SessionStore>,
    pub config: Config,
}
