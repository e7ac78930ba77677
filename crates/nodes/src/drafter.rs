//! Draft stage.

use std::sync::Arc;

use pipeline::ports::{CompletionRequest, LanguageModel, LlmError};
use pipeline::prompts::draft_prompt;
use pipeline::{EnrichmentResult, Passage, Qualification, ScoutError, Stage};
use tracing::{info, instrument};

use crate::retry::{with_retry, RetryConfig};

pub const DEFAULT_DRAFT_TEMPERATURE: f32 = 0.3;

/// Writes the outreach draft from everything gathered so far.
pub struct Drafter {
    model: Arc<dyn LanguageModel>,
    temperature: f32,
    retry: RetryConfig,
}

impl Drafter {
    /// Drafts with temperature [`DEFAULT_DRAFT_TEMPERATURE`].
    pub fn new(model: Arc<dyn LanguageModel>, retry: RetryConfig) -> Self {
        Self {
            model,
            temperature: DEFAULT_DRAFT_TEMPERATURE,
            retry,
        }
    }

    /// Overrides the drafting temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Returns the model's raw text. Any model failure is
    /// [`ScoutError::BackendUnavailable`].
    #[instrument(name = "draft", skip_all)]
    pub async fn draft(
        &self,
        goal: &str,
        passages: &[Passage],
        qualification: &Qualification,
        enrichment: &EnrichmentResult,
    ) -> Result<String, ScoutError> {
        let request = CompletionRequest::new(draft_prompt(goal, passages, qualification, enrichment))
            .with_temperature(self.temperature);

        let draft = with_retry(&self.retry, "draft", LlmError::retry_policy, || {
            self.model.complete(&request)
        })
        .await
        .map_err(|err| ScoutError::BackendUnavailable {
            stage: Stage::Draft,
            message: err.to_string(),
        })?;

        info!(chars = draft.len(), "draft written");
        Ok(draft)
    }
}
