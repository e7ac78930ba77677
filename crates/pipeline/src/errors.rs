//! Top-level error and retry-policy types for the scout pipeline.
//!
//! [`ScoutError`] covers conditions that abort a run. Port-level errors
//! ([`crate::ports::SearchError`], [`crate::ports::LlmError`],
//! [`crate::ports::ProviderError`]) are defined next to their traits; the
//! stages decide whether a port error becomes a [`ScoutError`] (fatal tier) or
//! a degraded value in state (degrade-and-continue tier).
//!
//! [`RetryPolicy`] is a cross-cutting concern: any error type that participates
//! in retry decisions must be able to produce a [`RetryPolicy`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Stage;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// Returned by port error types to let the retry wrapper decide whether to
/// re-invoke a remote call.
///
/// - `Retryable` errors: connection failures, timeouts, HTTP 429 and 5xx.
/// - `NonRetryable` errors: bad credentials, other 4xx, malformed responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt (e.g. from a `Retry-After`
        /// header). `None` means apply the caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

impl RetryPolicy {
    /// Returns `true` for [`RetryPolicy::Retryable`].
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Retryable { .. })
    }

    /// Classifies an HTTP error status: 429 and 5xx are retryable, every
    /// other status is not.
    pub fn for_http_status(status: u16, after: Option<Duration>) -> Self {
        if status == 429 || (500..600).contains(&status) {
            Self::Retryable { after }
        } else {
            Self::NonRetryable
        }
    }
}

// ---------------------------------------------------------------------------
// Run-level errors
// ---------------------------------------------------------------------------

/// Errors that abort a pipeline run.
///
/// Each variant that originates in a stage names that stage, so a failed run
/// can report where and why it stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ScoutError {
    /// A stage's only remote dependency could not be reached or answered with
    /// a failure.
    ///
    /// Produced by: Retriever (search backend), Qualifier and Drafter
    /// (language model).
    #[error("{stage} stage failed: backend unavailable: {message}")]
    BackendUnavailable {
        /// The stage whose backend failed.
        stage: Stage,
        /// Description of the failure, including the backend's own message.
        message: String,
    },

    /// The language model's structured output did not conform to the
    /// requested schema, or carried a score outside `[1, 10]`.
    ///
    /// Never retried: the same prompt is expected to produce the same class of
    /// output.
    #[error("{stage} stage failed: schema violation: {message}")]
    SchemaViolation {
        /// The stage that rejected the output.
        stage: Stage,
        /// What was wrong with the output.
        message: String,
    },

    /// A stage tried to write a state field that an earlier stage already
    /// wrote. Indicates a wiring bug in the driver, not a runtime condition.
    #[error("state field '{field}' was already written")]
    StateViolation {
        /// Name of the field.
        field: String,
    },

    /// The runtime configuration is invalid.
    ///
    /// Produced at load time; the pipeline never starts with an invalid config.
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },
}

impl ScoutError {
    /// Create a configuration error from any displayable message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Returns the stage the error originated in, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::BackendUnavailable { stage, .. } | Self::SchemaViolation { stage, .. } => {
                Some(*stage)
            }
            Self::StateViolation { .. } | Self::ConfigurationError { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_errors_name_the_stage() {
        let err = ScoutError::BackendUnavailable {
            stage: Stage::Retrieve,
            message: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "retrieve stage failed: backend unavailable: connection refused"
        );
        assert_eq!(err.stage(), Some(Stage::Retrieve));
    }

    #[test]
    fn http_status_classification() {
        let after = Some(Duration::from_secs(2));
        assert_eq!(
            RetryPolicy::for_http_status(429, after),
            RetryPolicy::Retryable { after }
        );
        assert!(RetryPolicy::for_http_status(503, None).is_retryable());
        assert!(!RetryPolicy::for_http_status(401, None).is_retryable());
        assert!(!RetryPolicy::for_http_status(404, None).is_retryable());
    }

    #[test]
    fn configuration_error_has_no_stage() {
        let err = ScoutError::configuration("llm.model is empty");
        assert_eq!(err.stage(), None);
        assert!(err.to_string().contains("llm.model is empty"));
    }
}
