use async_trait::async_trait;
use pipeline::ports::{EnrichmentProvider, EnrichmentQuery, ProviderError};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{fetch_object, http_client};

const PROVIDER: &str = "clearbit";
const API_BASE_URL: &str = "https://company.clearbit.com";

/// Clearbit company lookup, keyed by domain.
pub struct ClearbitClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ClearbitClient {
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
impl EnrichmentProvider for ClearbitClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn lookup(&self, query: &EnrichmentQuery) -> Result<Map<String, Value>, ProviderError> {
        let domain = query.domain_or_guess();
        debug!(%domain, "clearbit company lookup");

        let url = format!("{}/v1/companies/find", self.base_url.trim_end_matches('/'));
        let request = self
            .http
            .get(url)
            .bearer_auth(&self.api_key)
            .query(&[("domain", domain.as_str())]);

        fetch_object(PROVIDER, request).await
    }
}
