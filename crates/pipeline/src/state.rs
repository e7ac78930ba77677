//! The per-run state record threaded through every stage.

use serde::{Deserialize, Serialize};

use crate::{
    EnrichmentResult, NotificationOutcome, Passage, PipelineRunId, Qualification, ScoutError,
    TaskOutcome, Timestamp,
};

/// State of one pipeline run.
///
/// Owned by the driver for the duration of the run and never shared between
/// runs. Every field after `goal` starts unset and is written at most once by
/// the stage that owns it; a second write is rejected with
/// [`ScoutError::StateViolation`]. When the branch short-circuits after the
/// Qualifier, `enrichment`, `draft`, `task_reference` and `notification`
/// simply stay unset.
///
/// The serialised form is the audit record written by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    run_id: PipelineRunId,
    goal: String,
    started_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    passages: Option<Vec<Passage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    qualification: Option<Qualification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    entity_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enrichment: Option<EnrichmentResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    draft: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    task_reference: Option<TaskOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notification: Option<NotificationOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    finished_at: Option<Timestamp>,
}

fn write_once<T>(slot: &mut Option<T>, field: &str, value: T) -> Result<(), ScoutError> {
    if slot.is_some() {
        return Err(ScoutError::StateViolation {
            field: field.to_string(),
        });
    }
    *slot = Some(value);
    Ok(())
}

impl PipelineState {
    /// Creates the state for a new run with a fresh run id.
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            run_id: PipelineRunId::new_random(),
            goal: goal.into(),
            started_at: Timestamp::now(),
            passages: None,
            qualification: None,
            entity_name: None,
            enrichment: None,
            draft: None,
            task_reference: None,
            notification: None,
            finished_at: None,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Identifier recorded on the run's span and audit entry.
    pub fn run_id(&self) -> PipelineRunId {
        self.run_id
    }

    /// The goal text this run was started with.
    pub fn goal(&self) -> &str {
        &self.goal
    }

    /// When the run was created.
    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    /// Passages written by the Retriever; empty is a valid result.
    pub fn passages(&self) -> Option<&[Passage]> {
        self.passages.as_deref()
    }

    /// The Qualifier's verdict.
    pub fn qualification(&self) -> Option<&Qualification> {
        self.qualification.as_ref()
    }

    /// Copy of the qualification's entity name, set together with it.
    pub fn entity_name(&self) -> Option<&str> {
        self.entity_name.as_deref()
    }

    /// The Enricher's outcome, including the no-entity and error markers.
    pub fn enrichment(&self) -> Option<&EnrichmentResult> {
        self.enrichment.as_ref()
    }

    /// The outreach email written by the Drafter.
    pub fn draft(&self) -> Option<&str> {
        self.draft.as_deref()
    }

    /// What happened to the tracker task.
    pub fn task_reference(&self) -> Option<&TaskOutcome> {
        self.task_reference.as_ref()
    }

    /// What happened to the channel notification.
    pub fn notification(&self) -> Option<&NotificationOutcome> {
        self.notification.as_ref()
    }

    /// When the run ended, whichever way it ended.
    pub fn finished_at(&self) -> Option<Timestamp> {
        self.finished_at
    }

    // -----------------------------------------------------------------------
    // Write-once recorders
    // -----------------------------------------------------------------------

    /// Records the Retriever's passages.
    pub fn record_passages(&mut self, passages: Vec<Passage>) -> Result<(), ScoutError> {
        write_once(&mut self.passages, "passages", passages)
    }

    /// Records the qualification and its entity-name copy.
    pub fn record_qualification(&mut self, qualification: Qualification) -> Result<(), ScoutError> {
        if self.qualification.is_some() {
            return Err(ScoutError::StateViolation {
                field: "qualification".to_string(),
            });
        }
        self.entity_name = Some(qualification.entity_name.clone());
        self.qualification = Some(qualification);
        Ok(())
    }

    /// Records the Enricher's outcome.
    pub fn record_enrichment(&mut self, enrichment: EnrichmentResult) -> Result<(), ScoutError> {
        write_once(&mut self.enrichment, "enrichment", enrichment)
    }

    /// Records the Drafter's email.
    pub fn record_draft(&mut self, draft: String) -> Result<(), ScoutError> {
        write_once(&mut self.draft, "draft", draft)
    }

    /// Records both Publisher outcomes.
    pub fn record_publication(
        &mut self,
        task: TaskOutcome,
        notification: NotificationOutcome,
    ) -> Result<(), ScoutError> {
        write_once(&mut self.task_reference, "task_reference", task)?;
        write_once(&mut self.notification, "notification", notification)
    }

    /// Stamps the end of the run. Later calls keep the first timestamp.
    pub fn mark_finished(&mut self) {
        if self.finished_at.is_none() {
            self.finished_at = Some(Timestamp::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LeadScore;

    #[test]
    fn new_state_has_only_goal() {
        let state = PipelineState::new("find hiring leads");
        assert_eq!(state.goal(), "find hiring leads");
        assert!(state.passages().is_none());
        assert!(state.qualification().is_none());
        assert!(state.entity_name().is_none());
        assert!(state.enrichment().is_none());
        assert!(state.draft().is_none());
        assert!(state.task_reference().is_none());
        assert!(state.finished_at().is_none());
    }

    #[test]
    fn qualification_sets_entity_copy() {
        let mut state = PipelineState::new("goal");
        state
            .record_qualification(Qualification::new(LeadScore::new(9).unwrap(), "fit", "Acme"))
            .unwrap();
        assert_eq!(state.entity_name(), Some("Acme"));
    }

    #[test]
    fn fields_are_write_once() {
        let mut state = PipelineState::new("goal");
        state.record_passages(vec![Passage::new("a")]).unwrap();
        let err = state.record_passages(vec![]).unwrap_err();
        assert_eq!(
            err,
            ScoutError::StateViolation {
                field: "passages".into()
            }
        );
        assert_eq!(state.passages().map(<[Passage]>::len), Some(1));

        state.record_draft("hello".into()).unwrap();
        assert!(state.record_draft("again".into()).is_err());
        assert_eq!(state.draft(), Some("hello"));
    }

    #[test]
    fn audit_record_round_trips() {
        let mut state = PipelineState::new("goal");
        state.record_passages(vec![Passage::new("text")]).unwrap();
        state.record_enrichment(EnrichmentResult::NoEntity).unwrap();
        state.mark_finished();

        let json = serde_json::to_string(&state).unwrap();
        let parsed: PipelineState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
        assert!(!json.contains("\"draft\""));
    }
}
