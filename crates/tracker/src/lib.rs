//! Publisher side-effect adapters.
//!
//! | Type | Port | Service |
//! |------|------|---------|
//! | [`TrelloTracker`] | [`pipeline::ports::TaskTracker`] | Trello cards |
//! | [`NotionTracker`] | [`pipeline::ports::TaskTracker`] | Notion database pages |
//! | [`DiscordNotifier`] | [`pipeline::ports::Notifier`] | Discord channel messages |

mod discord;
mod notion;
mod trello;

pub use discord::DiscordNotifier;
pub use notion::NotionTracker;
pub use trello::TrelloTracker;

use std::time::Duration;

use pipeline::ports::ProviderError;
use serde_json::Value;

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

pub(crate) fn api_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

/// Trello credentials travel in the query string; drop the URL from the error.
fn transport(provider: &'static str, e: reqwest::Error) -> ProviderError {
    ProviderError::Transport {
        provider,
        message: e.without_url().to_string(),
    }
}

/// Sends `request`; returns the JSON body of a 2xx response, or `Null` for an
/// empty one.
pub(crate) async fn send(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<Value, ProviderError> {
    let response = request.send().await.map_err(|e| transport(provider, e))?;

    let status = response.status();
    if !status.is_success() {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64);
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
            retry_after,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport(provider, e))?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|e| ProviderError::InvalidResponse {
        provider,
        message: e.to_string(),
    })
}
