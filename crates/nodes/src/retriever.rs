//! Retrieve stage.

use std::sync::Arc;

use pipeline::ports::{SearchBackend, SearchError};
use pipeline::{Passage, ScoutError, Stage};
use tracing::{info, instrument};

use crate::retry::{with_retry, RetryConfig};

/// Queries the search backend with the goal.
///
/// Passages come back in the backend's order; nothing is re-ranked, deduped or
/// filtered here.
pub struct Retriever {
    backend: Arc<dyn SearchBackend>,
    retry: RetryConfig,
}

impl Retriever {
    /// Searches `backend`, retrying per `retry`.
    pub fn new(backend: Arc<dyn SearchBackend>, retry: RetryConfig) -> Self {
        Self { backend, retry }
    }

    /// Fails with [`ScoutError::BackendUnavailable`] when the backend cannot
    /// answer. An empty result is a success.
    #[instrument(name = "retrieve", skip_all)]
    pub async fn retrieve(&self, goal: &str) -> Result<Vec<Passage>, ScoutError> {
        let passages = with_retry(&self.retry, "search", SearchError::retry_policy, || {
            self.backend.search(goal)
        })
        .await
        .map_err(|err| ScoutError::BackendUnavailable {
            stage: Stage::Retrieve,
            message: err.to_string(),
        })?;

        info!(passages = passages.len(), "retrieved passages");
        Ok(passages)
    }
}
