//! Qualify stage.

use std::sync::Arc;

use pipeline::ports::{CompletionRequest, LanguageModel, LlmError};
use pipeline::prompts::{qualification_prompt, qualification_schema};
use pipeline::{is_actionable, Passage, Qualification, ScoutError, Stage};
use tracing::{info, instrument};

use crate::retry::{with_retry, RetryConfig};

/// Default sampling temperature for scoring. Deterministic output keeps the
/// branch decision stable across runs.
pub const DEFAULT_QUALIFY_TEMPERATURE: f32 = 0.0;

/// Scores the retrieved passages against the goal.
pub struct Qualifier {
    model: Arc<dyn LanguageModel>,
    temperature: f32,
    retry: RetryConfig,
}

impl Qualifier {
    /// Scores with temperature [`DEFAULT_QUALIFY_TEMPERATURE`].
    pub fn new(model: Arc<dyn LanguageModel>, retry: RetryConfig) -> Self {
        Self {
            model,
            temperature: DEFAULT_QUALIFY_TEMPERATURE,
            retry,
        }
    }

    /// Overrides the scoring temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Asks the model for a structured verdict and validates it.
    ///
    /// A response that is not JSON, misses a field, or carries a score outside
    /// `1..=10` is a [`ScoutError::SchemaViolation`]. Transport and status
    /// failures are [`ScoutError::BackendUnavailable`].
    #[instrument(name = "qualify", skip_all, fields(passages = passages.len()))]
    pub async fn qualify(
        &self,
        goal: &str,
        passages: &[Passage],
    ) -> Result<Qualification, ScoutError> {
        let request = CompletionRequest::new(qualification_prompt(goal, passages))
            .with_temperature(self.temperature);
        let schema = qualification_schema();

        let value = with_retry(&self.retry, "qualify", LlmError::retry_policy, || {
            self.model.complete_structured(&request, &schema)
        })
        .await
        .map_err(|err| match err {
            LlmError::MalformedResponse { message } => ScoutError::SchemaViolation {
                stage: Stage::Qualify,
                message,
            },
            other => ScoutError::BackendUnavailable {
                stage: Stage::Qualify,
                message: other.to_string(),
            },
        })?;

        let qualification: Qualification =
            serde_json::from_value(value).map_err(|err| ScoutError::SchemaViolation {
                stage: Stage::Qualify,
                message: err.to_string(),
            })?;

        info!(
            score = qualification.score.as_u8(),
            actionable = is_actionable(qualification.score),
            entity = %qualification.entity_name,
            "lead qualified"
        );
        Ok(qualification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeModel;
    use serde_json::json;

    fn qualifier(model: &Arc<FakeModel>) -> Qualifier {
        Qualifier::new(model.clone(), RetryConfig::default())
    }

    #[tokio::test]
    async fn parses_structured_verdict() {
        let model = Arc::new(FakeModel::structured(json!({
            "score": 9,
            "justification": "strong fit",
            "entity_name": "Acme Corp"
        })));

        let q = qualifier(&model)
            .qualify("find hiring leads", &[Passage::new("Acme needs a dev")])
            .await
            .unwrap();
        assert_eq!(q.score.as_u8(), 9);
        assert_eq!(q.justification, "strong fit");
        assert_eq!(q.entity_name, "Acme Corp");

        let requests = model.structured_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("Acme needs a dev"));
        assert_eq!(requests[0].temperature, Some(DEFAULT_QUALIFY_TEMPERATURE));
    }

    #[tokio::test]
    async fn out_of_range_score_is_a_schema_violation() {
        for score in [0, 11, -3] {
            let model = Arc::new(FakeModel::structured(json!({
                "score": score,
                "justification": "x",
                "entity_name": "Acme"
            })));
            let err = qualifier(&model).qualify("goal", &[]).await.unwrap_err();
            assert!(
                matches!(err, ScoutError::SchemaViolation { stage: Stage::Qualify, .. }),
                "score {score}: {err}"
            );
        }
    }

    #[tokio::test]
    async fn missing_field_is_a_schema_violation() {
        let model = Arc::new(FakeModel::structured(json!({ "score": 8 })));
        let err = qualifier(&model).qualify("goal", &[]).await.unwrap_err();
        assert!(matches!(err, ScoutError::SchemaViolation { .. }));
    }

    #[tokio::test]
    async fn malformed_model_output_is_a_schema_violation() {
        let model = Arc::new(FakeModel::failing_structured(LlmError::MalformedResponse {
            message: "expected value at line 1 column 1".into(),
        }));
        let err = qualifier(&model).qualify("goal", &[]).await.unwrap_err();
        assert!(matches!(err, ScoutError::SchemaViolation { .. }));
    }

    #[tokio::test]
    async fn unreachable_model_is_backend_unavailable() {
        let model = Arc::new(FakeModel::failing_structured(LlmError::Transport {
            message: "connection refused".into(),
        }));
        let err = qualifier(&model).qualify("goal", &[]).await.unwrap_err();
        assert!(matches!(
            err,
            ScoutError::BackendUnavailable { stage: Stage::Qualify, .. }
        ));
    }

    #[tokio::test]
    async fn legacy_company_name_field_is_accepted() {
        let model = Arc::new(FakeModel::structured(json!({
            "score": 8,
            "justification": "ok",
            "company_name": "Globex"
        })));
        let q = qualifier(&model).qualify("goal", &[]).await.unwrap();
        assert_eq!(q.entity_name, "Globex");
    }

    #[tokio::test]
    async fn schema_violations_are_not_retried() {
        let retry = RetryConfig {
            max_attempts: 3,
            base_delay: std::time::Duration::ZERO,
        };
        let malformed = Arc::new(FakeModel::failing_structured(LlmError::MalformedResponse {
            message: "not json".into(),
        }));
        let err = Qualifier::new(malformed.clone(), retry)
            .qualify("goal", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ScoutError::SchemaViolation { .. }));
        assert_eq!(malformed.structured_requests().len(), 1);

        let out_of_range = Arc::new(FakeModel::structured(json!({
            "score": 42,
            "justification": "x",
            "entity_name": "Acme"
        })));
        let err = Qualifier::new(out_of_range.clone(), retry)
            .qualify("goal", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ScoutError::SchemaViolation { .. }));
        assert_eq!(out_of_range.structured_requests().len(), 1);
    }
}
