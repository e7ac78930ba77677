use std::time::Duration;

use async_trait::async_trait;
use pipeline::ports::{Embedder, SearchError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{endpoint, http_client};

/// Text embeddings from an Ollama server.
pub struct OllamaEmbedder {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let http = http_client(timeout).map_err(|e| SearchError::Unavailable {
            message: e.to_string(),
        })?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, SearchError> {
        let response = self
            .http
            .post(endpoint(&self.base_url, "/api/embed"))
            .json(&EmbedRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| SearchError::Unavailable {
                message: format!("embedding model: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: EmbedResponse =
            response
                .json()
                .await
                .map_err(|e| SearchError::InvalidResponse {
                    message: format!("failed to parse embedding response: {e}"),
                })?;

        let vector = parsed.embeddings.into_iter().next().ok_or_else(|| {
            SearchError::InvalidResponse {
                message: "embedding response has no vectors".to_string(),
            }
        })?;
        debug!(model = %self.model, dimensions = vector.len(), "text embedded");
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embedder(server: &MockServer) -> OllamaEmbedder {
        OllamaEmbedder::new(server.uri(), "nomic-embed-text", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn returns_first_vector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .and(body_json(json!({ "model": "nomic-embed-text", "input": "hire a dev" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "nomic-embed-text",
                "embeddings": [[0.5, -0.25, 1.0]]
            })))
            .mount(&server)
            .await;

        let vector = embedder(&server).embed("hire a dev").await.unwrap();
        assert_eq!(vector, vec![0.5, -0.25, 1.0]);
    }

    #[tokio::test]
    async fn empty_embeddings_are_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "embeddings": [] })))
            .mount(&server)
            .await;

        let err = embedder(&server).embed("x").await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn unknown_model_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let err = embedder(&server).embed("x").await.unwrap_err();
        assert_eq!(
            err,
            SearchError::Status {
                status: 404,
                body: "model not found".into()
            }
        );
    }
}
