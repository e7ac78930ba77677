use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{ChannelId, RetryPolicy, TaskDestinationId, TaskReference};

/// Failures of the optional SaaS providers (enrichment, tracker, chat).
///
/// The stages never propagate these; they are folded into the degraded
/// values recorded in state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider needs credentials that were not configured.
    #[error("{provider}: credentials not configured")]
    MissingCredentials { provider: &'static str },

    /// The provider could not be reached.
    #[error("{provider}: request failed: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("{provider}: HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
        retry_after: Option<Duration>,
    },

    /// The provider answered 2xx with a body that could not be understood.
    #[error("{provider}: invalid response: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    /// Transport failures and 429/5xx are retryable, honouring `Retry-After`.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Transport { .. } => RetryPolicy::Retryable { after: None },
            Self::Status {
                status,
                retry_after,
                ..
            } => RetryPolicy::for_http_status(*status, *retry_after),
            Self::MissingCredentials { .. } | Self::InvalidResponse { .. } => {
                RetryPolicy::NonRetryable
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// What to look up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentQuery {
    /// Company or person name, as identified by the Qualifier.
    pub entity_name: String,

    /// Company domain, when known. Providers that key on domains derive one
    /// from `entity_name` otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl EnrichmentQuery {
    /// A lookup keyed on the entity name alone.
    pub fn by_name(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            domain: None,
        }
    }

    /// Sets an explicit company domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// The explicit domain, or one derived from the name: lowercased, spaces
    /// removed, `.com` appended.
    pub fn domain_or_guess(&self) -> String {
        match &self.domain {
            Some(domain) => domain.clone(),
            None => {
                let compact: String = self
                    .entity_name
                    .to_lowercase()
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                format!("{compact}.com")
            }
        }
    }
}

/// Contact/company data lookup.
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    /// Short provider name for logs and error messages.
    fn name(&self) -> &'static str;

    /// Returns the provider's fields for the entity.
    async fn lookup(&self, query: &EnrichmentQuery) -> Result<Map<String, Value>, ProviderError>;
}

// ---------------------------------------------------------------------------
// Task tracking
// ---------------------------------------------------------------------------

/// A task to file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
}

/// External task tracker (Trello board, Notion database, ...).
#[async_trait]
pub trait TaskTracker: Send + Sync {
    fn name(&self) -> &'static str;

    /// Creates `task` under `destination` and returns the tracker's reference
    /// to it.
    async fn create_task(
        &self,
        destination: &TaskDestinationId,
        task: &NewTask,
    ) -> Result<TaskReference, ProviderError>;
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Chat notification sink. Fire-and-forget: success carries no payload.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn post_message(&self, channel: &ChannelId, text: &str) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_is_guessed_from_name() {
        let query = EnrichmentQuery::by_name("Acme Corp");
        assert_eq!(query.domain_or_guess(), "acmecorp.com");
    }

    #[test]
    fn explicit_domain_wins() {
        let query = EnrichmentQuery::by_name("Acme Corp").with_domain("acme.io");
        assert_eq!(query.domain_or_guess(), "acme.io");
    }

    #[test]
    fn missing_credentials_are_not_retried() {
        let err = ProviderError::MissingCredentials { provider: "hunter" };
        assert_eq!(err.retry_policy(), RetryPolicy::NonRetryable);
        assert_eq!(err.to_string(), "hunter: credentials not configured");
    }
}
