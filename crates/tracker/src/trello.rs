use async_trait::async_trait;
use pipeline::ports::{NewTask, ProviderError, TaskTracker};
use pipeline::{TaskDestinationId, TaskReference};
use serde::Deserialize;
use tracing::debug;

use crate::{api_url, http_client, send};

const PROVIDER: &str = "trello";
const API_BASE_URL: &str = "https://api.trello.com";

/// Creates a Trello card per lead. The destination id is the target list.
pub struct TrelloTracker {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    token: String,
}

#[derive(Deserialize)]
struct Card {
    id: Option<String>,
    #[serde(rename = "shortUrl")]
    short_url: Option<String>,
}

impl TrelloTracker {
    pub fn new(api_key: impl Into<String>, token: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            http: http_client(PROVIDER)?,
            base_url: API_BASE_URL.to_string(),
            api_key: api_key.into(),
            token: token.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl TaskTracker for TrelloTracker {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn create_task(
        &self,
        destination: &TaskDestinationId,
        task: &NewTask,
    ) -> Result<TaskReference, ProviderError> {
        debug!(list = %destination, title = %task.title, "creating trello card");

        let request = self.http.post(api_url(&self.base_url, "/1/cards")).query(&[
            ("key", self.api_key.as_str()),
            ("token", self.token.as_str()),
            ("idList", destination.as_str()),
            ("name", task.title.as_str()),
            ("desc", task.description.as_str()),
        ]);

        let card: Card = serde_json::from_value(send(PROVIDER, request).await?).map_err(|e| {
            ProviderError::InvalidResponse {
                provider: PROVIDER,
                message: e.to_string(),
            }
        })?;

        card.short_url
            .or(card.id)
            .and_then(TaskReference::new)
            .ok_or(ProviderError::InvalidResponse {
                provider: PROVIDER,
                message: "card has neither shortUrl nor id".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tracker(server: &MockServer) -> TrelloTracker {
        TrelloTracker::new("key1", "tok1").unwrap().with_base_url(server.uri())
    }

    fn task() -> NewTask {
        NewTask {
            title: "New Lead: Acme".into(),
            description: "**Draft Email:**\nHi".into(),
        }
    }

    #[tokio::test]
    async fn creates_card_and_returns_short_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1/cards"))
            .and(query_param("key", "key1"))
            .and(query_param("token", "tok1"))
            .and(query_param("idList", "list-9"))
            .and(query_param("name", "New Lead: Acme"))
            .and(query_param("desc", "**Draft Email:**\nHi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "65a1",
                "shortUrl": "https://trello.com/c/Ab12"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reference = tracker(&server)
            .create_task(&TaskDestinationId::new("list-9").unwrap(), &task())
            .await
            .unwrap();
        assert_eq!(reference.as_str(), "https://trello.com/c/Ab12");
    }

    #[tokio::test]
    async fn falls_back_to_card_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "65a1" })))
            .mount(&server)
            .await;

        let reference = tracker(&server)
            .create_task(&TaskDestinationId::new("list-9").unwrap(), &task())
            .await
            .unwrap();
        assert_eq!(reference.as_str(), "65a1");
    }

    #[tokio::test]
    async fn invalid_list_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid value for idList"))
            .mount(&server)
            .await;

        let err = tracker(&server)
            .create_task(&TaskDestinationId::new("nope").unwrap(), &task())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "trello: HTTP 400: invalid value for idList");
        assert!(!err.retry_policy().is_retryable());
    }

    #[tokio::test]
    async fn transport_error_does_not_expose_credentials() {
        let err = TrelloTracker::new("KEYSECRET", "TOKENSECRET")
            .unwrap()
            .with_base_url("http://127.0.0.1:1")
            .create_task(&TaskDestinationId::new("list").unwrap(), &task())
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, ProviderError::Transport { .. }));
        assert!(!message.contains("KEYSECRET"));
        assert!(!message.contains("TOKENSECRET"));
    }
}
