use async_trait::async_trait;
use thiserror::Error;

use crate::{Passage, RetryPolicy};

/// Failures of the search backend or the embedding model behind it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The backend could not be reached (connection refused, DNS, timeout).
    #[error("search backend unreachable: {message}")]
    Unavailable { message: String },

    /// The backend answered with a non-success HTTP status.
    #[error("search backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend answered 2xx but the body could not be understood.
    #[error("search backend returned an invalid response: {message}")]
    InvalidResponse { message: String },
}

impl SearchError {
    /// An unreachable backend or 429/5xx status is retryable.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Unavailable { .. } => RetryPolicy::Retryable { after: None },
            Self::Status { status, .. } => RetryPolicy::for_http_status(*status, None),
            Self::InvalidResponse { .. } => RetryPolicy::NonRetryable,
        }
    }
}

/// Similarity search over previously ingested documents.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Returns the passages the backend ranks as relevant to `query`, in the
    /// backend's order. An empty result is not an error.
    async fn search(&self, query: &str) -> Result<Vec<Passage>, SearchError>;
}

/// Turns text into the vector a [`SearchBackend`] queries with.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, SearchError>;
}
