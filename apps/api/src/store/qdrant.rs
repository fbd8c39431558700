//! Qdrant REST backend.
//!
//! Talks to the HTTP API directly with reqwest:
//! - `GET  /collections/{name}` (404 when missing)
//! - `PUT  /collections/{name}` create with cosine distance
//! - `PUT  /collections/{name}/index` keyword payload index
//! - `PUT  /collections/{name}/points?wait=true` upsert
//! - `POST /collections/{name}/points/scroll` payload lookup by file hash
//! - `POST /collections/{name}/points/search` filtered similarity search
//! - `POST /collections/{name}/points/count`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{
    CvPoint, RetrievedSection, SearchFilter, SectionPayload, StoreError, VectorStore, INDEXED_FIELDS,
};

#[derive(Debug, Deserialize)]
struct QdrantResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct ScrollResult {
    points: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    #[serde(default)]
    score: f32,
    payload: Option<SectionPayload>,
}

#[derive(Debug, Deserialize)]
struct CountResult {
    count: u64,
}

#[derive(Clone)]
pub struct QdrantStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    collection: String,
    dimension: usize,
}

impl QdrantStore {
    pub fn new(
        url: &str,
        api_key: Option<String>,
        collection: String,
        dimension: usize,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            base_url: url.trim_end_matches('/').to_string(),
            api_key,
            collection,
            dimension,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/collections/{}{}", self.base_url, self.collection, path);
        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, StoreError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }
        let body: QdrantResponse<T> = response.json().await?;
        Ok(body.result)
    }

    async fn collection_exists(&self) -> Result<bool, StoreError> {
        let response = self.request(Method::GET, "").send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            s if s.is_success() => Ok(true),
            s => Err(StoreError::Api {
                status: s.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn scroll_one(&self, file_hash: &str) -> Result<Option<SectionPayload>, StoreError> {
        let body = json!({
            "filter": { "must": [match_any("file_hash", &[file_hash.to_string()])] },
            "limit": 1,
            "with_payload": true,
            "with_vector": false,
        });
        let result: ScrollResult = self
            .send(self.request(Method::POST, "/points/scroll").json(&body))
            .await?;
        Ok(result.points.into_iter().next().and_then(|p| p.payload))
    }
}

fn match_any(key: &str, values: &[String]) -> Value {
    json!({ "key": key, "match": { "any": values } })
}

/// Translates a `SearchFilter` into Qdrant's filter JSON.
fn filter_json(filter: &SearchFilter) -> Value {
    let mut must = vec![match_any("file_hash", &filter.file_hashes)];
    if let Some(names) = &filter.candidate_names_lower {
        must.push(match_any("candidate_name_lower", names));
    }
    json!({ "must": must })
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn ensure_collection(&self) -> Result<(), StoreError> {
        info!("Checking for collection: {}", self.collection);

        if self.collection_exists().await? {
            info!("Collection '{}' already exists", self.collection);
        } else {
            let body = json!({
                "vectors": { "size": self.dimension, "distance": "Cosine" }
            });
            let _: Value = self.send(self.request(Method::PUT, "").json(&body)).await?;
            info!(
                "Created collection '{}' (size {}, cosine)",
                self.collection, self.dimension
            );
        }

        for field in INDEXED_FIELDS {
            let body = json!({ "field_name": field, "field_schema": "keyword" });
            let result: Result<Value, _> = self
                .send(self.request(Method::PUT, "/index?wait=true").json(&body))
                .await;
            match result {
                Ok(_) => debug!("Payload index ready for '{field}'"),
                Err(e) => warn!("Payload index for '{field}' not created: {e}"),
            }
        }

        Ok(())
    }

    async fn upsert(&self, points: &[CvPoint]) -> Result<(), StoreError> {
        if points.is_empty() {
            return Ok(());
        }
        if let Some(bad) = points.iter().find(|p| p.vector.len() != self.dimension) {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: bad.vector.len(),
            });
        }

        let body = json!({
            "points": points
                .iter()
                .map(|p| json!({
                    "id": p.id.to_string(),
                    "vector": p.vector,
                    "payload": p.payload,
                }))
                .collect::<Vec<_>>()
        });
        let _: Value = self
            .send(self.request(Method::PUT, "/points?wait=true").json(&body))
            .await?;
        debug!("Upserted {} points into '{}'", points.len(), self.collection);
        Ok(())
    }

    async fn document_exists(&self, file_hash: &str) -> Result<bool, StoreError> {
        Ok(self.scroll_one(file_hash).await?.is_some())
    }

    async fn candidate_for(&self, file_hash: &str) -> Result<Option<String>, StoreError> {
        Ok(self.scroll_one(file_hash).await?.map(|p| p.candidate_name))
    }

    async fn search(
        &self,
        vector: &[f32],
        filter: &SearchFilter,
        limit: usize,
    ) -> Result<Vec<RetrievedSection>, StoreError> {
        let body = json!({
            "vector": vector,
            "filter": filter_json(filter),
            "limit": limit,
            "with_payload": true,
        });
        let points: Vec<ScoredPoint> = self
            .send(self.request(Method::POST, "/points/search").json(&body))
            .await?;

        Ok(points
            .into_iter()
            .filter_map(|p| {
                let score = p.score;
                p.payload.map(|payload| RetrievedSection {
                    content: payload.content,
                    candidate_name: payload.candidate_name,
                    section: payload.section,
                    score,
                })
            })
            .collect())
    }

    async fn point_count(&self) -> Result<u64, StoreError> {
        let result: CountResult = self
            .send(
                self.request(Method::POST, "/points/count")
                    .json(&json!({ "exact": true })),
            )
            .await?;
        Ok(result.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_json_session_only() {
        let filter = SearchFilter::for_files(vec!["h1".to_string(), "h2".to_string()]);
        assert_eq!(
            filter_json(&filter),
            json!({ "must": [{ "key": "file_hash", "match": { "any": ["h1", "h2"] } }] })
        );
    }

    #[test]
    fn test_filter_json_with_candidates() {
        let filter = SearchFilter::for_files(vec!["h1".to_string()])
            .with_candidates(&["Saif Khan".to_string()]);
        let value = filter_json(&filter);
        assert_eq!(value["must"].as_array().unwrap().len(), 2);
        assert_eq!(value["must"][1]["key"], "candidate_name_lower");
        assert_eq!(value["must"][1]["match"]["any"][0], "saif khan");
    }

    #[test]
    fn test_search_response_deserializes() {
        let json = r#"{
            "result": [
                {"id": "6f0e8f3a-9b4e-4a8b-8f0e-0c6f0b1e2d3c", "version": 3, "score": 0.82,
                 "payload": {"content": "Rust, Go", "section": "Skills", "file_hash": "abc",
                             "candidate_name": "Alice", "candidate_name_lower": "alice"}}
            ],
            "status": "ok",
            "time": 0.001
        }"#;
        let body: QdrantResponse<Vec<ScoredPoint>> = serde_json::from_str(json).unwrap();
        let payload = body.result[0].payload.as_ref().unwrap();
        assert_eq!(payload.section, "Skills");
        assert!((body.result[0].score - 0.82).abs() < f32::EPSILON);
    }

    #[test]
    fn test_scroll_response_without_points() {
        let json = r#"{"result": {"points": [], "next_page_offset": null}, "status": "ok"}"#;
        let body: QdrantResponse<ScrollResult> = serde_json::from_str(json).unwrap();
        assert!(body.result.points.is_empty());
    }

    #[test]
    fn test_request_targets_collection() {
        let store = QdrantStore::new("http://localhost:6333/", None, "cv_collection".to_string(), 384)
            .unwrap();
        let request = store.request(Method::POST, "/points/search").build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost:6333/collections/cv_collection/points/search"
        );
        assert!(request.headers().get("api-key").is_none());
    }
}
