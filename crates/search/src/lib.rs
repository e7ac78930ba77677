//! Qdrant search adapter.
//!
//! [`QdrantSearch`] implements [`pipeline::ports::SearchBackend`] by embedding
//! the query with an injected [`Embedder`] and asking Qdrant for the nearest
//! points. Each point's payload is expected to carry the passage text under
//! `page_content` and its source metadata under `metadata`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** The Retriever sees only the `SearchBackend` port.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pipeline::ports::{Embedder, SearchBackend, SearchError};
use pipeline::Passage;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Number of passages requested per query.
pub const DEFAULT_TOP_K: usize = 4;

pub struct QdrantSearch {
    http: reqwest::Client,
    url: String,
    collection: String,
    top_k: usize,
    embedder: Arc<dyn Embedder>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScoredPoint {
    id: Value,
    score: f64,
    #[serde(default)]
    payload: Option<Map<String, Value>>,
}

impl ScoredPoint {
    /// Builds the passage, or `None` when the payload has no text.
    fn into_passage(self) -> Option<Passage> {
        let mut payload = self.payload?;
        let Some(Value::String(text)) = payload.remove("page_content") else {
            return None;
        };
        let metadata = match payload.remove("metadata") {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Some(
            Passage {
                text,
                metadata,
            }
            .with_metadata("score", self.score)
            .with_metadata("id", self.id),
        )
    }
}

impl QdrantSearch {
    pub fn new(
        url: impl Into<String>,
        collection: impl Into<String>,
        embedder: Arc<dyn Embedder>,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::Unavailable {
                message: e.to_string(),
            })?;
        Ok(Self {
            http,
            url: url.into(),
            collection: collection.into(),
            top_k: DEFAULT_TOP_K,
            embedder,
        })
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    fn search_url(&self) -> String {
        format!(
            "{}/collections/{}/points/search",
            self.url.trim_end_matches('/'),
            self.collection
        )
    }
}

#[async_trait]
impl SearchBackend for QdrantSearch {
    async fn search(&self, query: &str) -> Result<Vec<Passage>, SearchError> {
        let vector = self.embedder.embed(query).await?;

        let response = self
            .http
            .post(self.search_url())
            .json(&SearchRequest {
                vector: &vector,
                limit: self.top_k,
                with_payload: true,
            })
            .send()
            .await
            .map_err(|e| SearchError::Unavailable {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| SearchError::InvalidResponse {
                    message: format!("failed to parse search response: {e}"),
                })?;

        let hits = parsed.result.len();
        let passages: Vec<Passage> = parsed
            .result
            .into_iter()
            .filter_map(ScoredPoint::into_passage)
            .collect();
        if passages.len() < hits {
            warn!(
                skipped = hits - passages.len(),
                collection = %self.collection,
                "search hits without page_content skipped"
            );
        }
        debug!(hits, passages = passages.len(), "search complete");
        Ok(passages)
    }
}
