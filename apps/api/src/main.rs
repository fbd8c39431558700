mod config;
mod embedding;
mod errors;
mod extract;
mod ingest;
mod llm_client;
mod pdf;
mod rag;
mod report;
mod routes;
mod session;
mod state;
mod store;

#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::embedding::{Embedder, HttpEmbedder};
use crate::llm_client::{ChatModel, LlmClient};
use crate::routes::build_router;
use crate::session::{MemorySessionStore, RedisSessionStore, SessionStore};
use crate::state::AppState;
use crate::store::{MemoryStore, QdrantStore, VectorStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV RAG API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm: Arc<dyn ChatModel> = Arc::new(
        LlmClient::new(
            config.groq_api_key.clone(),
            config.groq_model.clone(),
            &config.llm_base_url,
        )
        .context("Failed to build LLM client")?,
    );
    info!("LLM client initialized (model: {})", llm.model_name());

    // Initialize embedding client
    let embedder: Arc<dyn Embedder> = Arc::new(
        HttpEmbedder::new(
            &config.embedding_base_url,
            config.embedding_model.clone(),
            config.embedding_api_key.clone(),
            config.vector_size,
        )
        .context("Failed to build embedding client")?,
    );
    info!(
        "Embedding client initialized (model: {}, dimension: {})",
        embedder.model_name(),
        embedder.dimension()
    );

    // Initialize vector index
    let store = build_vector_store(&config)?;
    store
        .ensure_collection()
        .await
        .context("Vector collection setup failed")?;
    info!("Vector index ready");

    // Initialize session store
    let sessions = build_session_store(&config)?;

    let state = AppState {
        llm,
        embedder,
        store,
        sessions,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Qdrant when `QDRANT_URL` is set, otherwise a process-local index.
fn build_vector_store(config: &Config) -> Result<Arc<dyn VectorStore>> {
    match &config.qdrant_url {
        Some(url) => {
            let store = QdrantStore::new(
                url,
                config.qdrant_api_key.clone(),
                config.collection_name.clone(),
                config.vector_size,
            )
            .context("Failed to build Qdrant client")?;
            info!("Using Qdrant at {url} (collection: {})", config.collection_name);
            Ok(Arc::new(store))
        }
        None => {
            warn!("QDRANT_URL not set, using in-memory vector index; data is lost on restart");
            Ok(Arc::new(MemoryStore::new(config.vector_size)))
        }
    }
}

/// Redis when `REDIS_URL` is set, otherwise process-local sessions.
fn build_session_store(config: &Config) -> Result<Arc<dyn SessionStore>> {
    match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str()).context("Invalid REDIS_URL")?;
            info!("Redis session store initialized");
            Ok(Arc::new(RedisSessionStore::new(client, config.session_ttl_secs)))
        }
        None => {
            warn!("REDIS_URL not set, sessions are kept in process memory");
            Ok(Arc::new(MemorySessionStore::new()))
        }
    }
}
