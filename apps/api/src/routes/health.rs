use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::state::AppState;

/// GET /health
/// Returns service version and the number of indexed CV sections
/// (`null` when the vector index is unreachable).
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let indexed_sections = match state.store.point_count().await {
        Ok(count) => Some(count),
        Err(e) => {
            warn!("Health check could not reach vector index: {e}");
            None
        }
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "cvrag-api",
        "indexed_sections": indexed_sections
    }))
}
