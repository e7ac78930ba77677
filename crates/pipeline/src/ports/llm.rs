use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::RetryPolicy;

/// A single-prompt completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The full prompt, sent as one user message.
    pub prompt: String,

    /// Sampling temperature. `None` leaves the provider default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// A request with the provider's default temperature.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
        }
    }

    /// Overrides the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A JSON Schema the structured-output mode must conform to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSchema {
    /// Short name of the schema, used in logs and by providers that need one.
    pub name: String,
    /// The JSON Schema document.
    pub schema: serde_json::Value,
}

/// Failures of the language-model backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    /// The backend could not be reached.
    #[error("language model unreachable: {message}")]
    Transport { message: String },

    /// The backend answered with a non-success HTTP status.
    #[error("language model returned HTTP {status}: {body}")]
    Status {
        status: u16,
        body: String,
        /// Parsed `Retry-After`, when present.
        retry_after: Option<Duration>,
    },

    /// The response could not be interpreted: missing content, or content that
    /// is not valid JSON in structured mode.
    #[error("language model returned a malformed response: {message}")]
    MalformedResponse { message: String },
}

impl LlmError {
    /// Transport failures and 429/5xx are retryable; malformed output is not.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Transport { .. } => RetryPolicy::Retryable { after: None },
            Self::Status {
                status,
                retry_after,
                ..
            } => RetryPolicy::for_http_status(*status, *retry_after),
            Self::MalformedResponse { .. } => RetryPolicy::NonRetryable,
        }
    }
}

/// A language model with a free-text mode and a schema-constrained mode.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the model's free-text answer.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;

    /// Returns the model's answer parsed as JSON, generated under `schema`.
    ///
    /// Implementations guarantee the value is well-formed JSON; checking it
    /// against the schema's semantics is the caller's job.
    async fn complete_structured(
        &self,
        request: &CompletionRequest,
        schema: &OutputSchema,
    ) -> Result<serde_json::Value, LlmError>;
}
