use async_trait::async_trait;
use pipeline::ports::{EnrichmentProvider, EnrichmentQuery, ProviderError};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{fetch_object, http_client};

const PROVIDER: &str = "hunter";
const API_BASE_URL: &str = "https://api.hunter.io";

/// Hunter.io company enrichment, keyed by domain.
pub struct HunterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HunterClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            http: http_client(PROVIDER)?,
            base_url: API_BASE_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl EnrichmentProvider for HunterClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    /// Returns the `data` object of the company-enrichment response.
    async fn lookup(&self, query: &EnrichmentQuery) -> Result<Map<String, Value>, ProviderError> {
        let domain = query.domain_or_guess();
        debug!(%domain, "hunter company lookup");

        let url = format!(
            "{}/v2/company-enrichment",
            self.base_url.trim_end_matches('/')
        );
        let request = self.http.get(url).query(&[
            ("domain", domain.as_str()),
            ("api_key", self.api_key.as_str()),
        ]);

        let mut body = fetch_object(PROVIDER, request).await?;
        match body.remove("data") {
            Some(Value::Object(data)) => Ok(data),
            _ => Err(ProviderError::InvalidResponse {
                provider: PROVIDER,
                message: "response has no data object".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> HunterClient {
        HunterClient::new("secret").unwrap().with_base_url(server.uri())
    }

    #[tokio::test]
    async fn looks_up_guessed_domain() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/company-enrichment"))
            .and(query_param("domain", "acmecorp.com"))
            .and(query_param("api_key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "name": "Acme Corp", "category": { "industry": "Software" } },
                "meta": { "domain": "acmecorp.com" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let data = client(&server)
            .lookup(&EnrichmentQuery::by_name("Acme Corp"))
            .await
            .unwrap();
        assert_eq!(data["name"], "Acme Corp");
        assert!(!data.contains_key("meta"));
    }

    #[tokio::test]
    async fn explicit_domain_is_used() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("domain", "acme.io"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .lookup(&EnrichmentQuery::by_name("Acme").with_domain("acme.io"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unauthorized_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("No user found for the API key"))
            .mount(&server)
            .await;

        let err = client(&server)
            .lookup(&EnrichmentQuery::by_name("Acme"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "hunter: HTTP 401: No user found for the API key"
        );
    }

    #[tokio::test]
    async fn missing_data_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "errors": [] })))
            .mount(&server)
            .await;

        let err = client(&server)
            .lookup(&EnrichmentQuery::by_name("Acme"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn transport_error_does_not_expose_api_key() {
        let err = HunterClient::new("SUPERSECRETKEY")
            .unwrap()
            .with_base_url("http://127.0.0.1:1")
            .lookup(&EnrichmentQuery::by_name("Acme").with_domain("acme.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Transport { .. }));
        assert!(!err.to_string().contains("SUPERSECRETKEY"));
    }
}
