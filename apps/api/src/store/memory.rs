//! In-memory vector store.
//!
//! Brute-force cosine search over every stored point. Used when `QDRANT_URL` is unset
//! (local development) and throughout the test suite.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{CvPoint, RetrievedSection, SearchFilter, StoreError, VectorStore};

#[derive(Clone)]
pub struct MemoryStore {
    dimension: usize,
    points: Arc<RwLock<HashMap<Uuid, CvPoint>>>,
}

impl MemoryStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            points: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn ensure_collection(&self) -> Result<(), StoreError> {
        debug!("MemoryStore ready (dimension: {})", self.dimension);
        Ok(())
    }

    async fn upsert(&self, points: &[CvPoint]) -> Result<(), StoreError> {
        if let Some(bad) = points.iter().find(|p| p.vector.len() != self.dimension) {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: bad.vector.len(),
            });
        }

        let mut store = self.points.write().await;
        for point in points {
            store.insert(point.id, point.clone());
        }
        debug!("Upserted {} points", points.len());
        Ok(())
    }

    async fn document_exists(&self, file_hash: &str) -> Result<bool, StoreError> {
        let store = self.points.read().await;
        Ok(store.values().any(|p| p.payload.file_hash == file_hash))
    }

    async fn candidate_for(&self, file_hash: &str) -> Result<Option<String>, StoreError> {
        let store = self.points.read().await;
        Ok(store
            .values()
            .find(|p| p.payload.file_hash == file_hash)
            .map(|p| p.payload.candidate_name.clone()))
    }

    async fn search(
        &self,
        vector: &[f32],
        filter: &SearchFilter,
        limit: usize,
    ) -> Result<Vec<RetrievedSection>, StoreError> {
        let store = self.points.read().await;

        let mut scored: Vec<(f32, &CvPoint)> = store
            .values()
            .filter(|p| filter.matches(&p.payload))
            .map(|p| (Self::cosine_similarity(vector, &p.vector), p))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(score, p)| RetrievedSection {
                content: p.payload.content.clone(),
                candidate_name: p.payload.candidate_name.clone(),
                section: p.payload.section.clone(),
                score,
            })
            .collect())
    }

    async fn point_count(&self) -> Result<u64, StoreError> {
        Ok(self.points.read().await.len() as u64)
    }
}
