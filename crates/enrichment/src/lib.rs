//! Company enrichment adapters.
//!
//! Both types implement [`pipeline::ports::EnrichmentProvider`]. Which one the
//! Enricher receives is decided by configuration in the CLI.

mod clearbit;
mod hunter;

pub use clearbit::ClearbitClient;
pub use hunter::HunterClient;

use std::time::Duration;

use pipeline::ports::ProviderError;
use serde_json::{Map, Value};

/// Request timeout for enrichment lookups.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn http_client(provider: &'static str) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .map_err(|e| ProviderError::Transport {
            provider,
            message: e.to_string(),
        })
}

/// Request URLs carry API keys in the query string, so they are stripped
/// before the error text is kept.
fn transport(provider: &'static str, e: reqwest::Error) -> ProviderError {
    ProviderError::Transport {
        provider,
        message: e.without_url().to_string(),
    }
}

/// Sends `request` and returns the JSON object body of a 2xx response.
pub(crate) async fn fetch_object(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<Map<String, Value>, ProviderError> {
    let response = request.send().await.map_err(|e| transport(provider, e))?;

    let status = response.status();
    if !status.is_success() {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
            retry_after,
        });
    }

    match response.json::<Value>().await {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ProviderError::InvalidResponse {
            provider,
            message: format!("expected a JSON object, got {other}"),
        }),
        Err(e) => Err(ProviderError::InvalidResponse {
            provider,
            message: e.without_url().to_string(),
        }),
    }
}
