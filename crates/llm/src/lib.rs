//! Ollama infrastructure adapters.
//!
//! [`OllamaChat`] implements [`pipeline::ports::LanguageModel`] over
//! `/api/chat`; [`OllamaEmbedder`] implements [`pipeline::ports::Embedder`]
//! over `/api/embed`. Other model servers are added as new types in this
//! crate without any change to the `pipeline` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request formatting and response
//! parsing live here. The stages see only the port traits.

mod chat;
mod embed;

pub use chat::OllamaChat;
pub use embed::OllamaEmbedder;

use std::time::Duration;

/// Default request timeout for model calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

/// Parses a `Retry-After` header given in seconds.
pub(crate) fn retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
