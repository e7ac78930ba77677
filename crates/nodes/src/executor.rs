//! The driver loop.
//!
//! The executor owns one [`PipelineState`] per run, calls one stage at a time,
//! records the stage's output, and asks [`next_route`] where to go next. A
//! fatal stage error stops the run; the partially populated state is still
//! returned in the [`RunReport`] for auditing.

use pipeline::{next_route, PipelineState, Route, ScoutError, Stage};
use serde::{Deserialize, Serialize};
use tracing::{error, info, info_span, Instrument};

use crate::{Drafter, Enricher, Publisher, Qualifier, Retriever};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The lead passed the threshold and the Publisher ran.
    Published,
    /// The lead scored at or below the threshold; the run stopped after
    /// qualification.
    NotActionable,
    /// A stage failed fatally.
    Failed { error: ScoutError },
}

/// Final state and outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub state: PipelineState,
    /// Stages that completed, in order.
    pub completed: Vec<Stage>,
    #[serde(flatten)]
    pub outcome: RunOutcome,
}

impl RunReport {
    /// True when a stage failed fatally.
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, RunOutcome::Failed { .. })
    }

    /// The failing stage, for fatal stage errors.
    pub fn failed_stage(&self) -> Option<Stage> {
        match &self.outcome {
            RunOutcome::Failed { error } => error.stage(),
            RunOutcome::Published | RunOutcome::NotActionable => None,
        }
    }
}

/// Drives the five stages for one goal at a time.
pub struct PipelineExecutor {
    retriever: Retriever,
    qualifier: Qualifier,
    enricher: Enricher,
    drafter: Drafter,
    publisher: Publisher,
}

impl PipelineExecutor {
    /// Wires the five stages into a driver.
    pub fn new(
        retriever: Retriever,
        qualifier: Qualifier,
        enricher: Enricher,
        drafter: Drafter,
        publisher: Publisher,
    ) -> Self {
        Self {
            retriever,
            qualifier,
            enricher,
            drafter,
            publisher,
        }
    }

    /// Runs the pipeline for `goal` with a fresh state.
    pub async fn run(&self, goal: &str) -> RunReport {
        let state = PipelineState::new(goal);
        let span = info_span!("pipeline_run", run_id = %state.run_id(), goal = %goal);
        self.drive(state).instrument(span).await
    }

    async fn drive(&self, mut state: PipelineState) -> RunReport {
        let mut completed = Vec::new();
        let mut stage = Stage::FIRST;

        let outcome = loop {
            if let Err(error) = self.run_stage(stage, &mut state).await {
                error!(%stage, %error, "run failed");
                break RunOutcome::Failed { error };
            }
            completed.push(stage);

            match next_route(stage, &state) {
                Route::Continue(next) => stage = next,
                Route::Terminate if stage == Stage::Publish => break RunOutcome::Published,
                Route::Terminate => {
                    info!(after = %stage, "lead not actionable, stopping");
                    break RunOutcome::NotActionable;
                }
            }
        };

        state.mark_finished();
        info!(outcome = ?outcome, stages = completed.len(), "run finished");
        RunReport {
            state,
            completed,
            outcome,
        }
    }

    async fn run_stage(&self, stage: Stage, state: &mut PipelineState) -> Result<(), ScoutError> {
        match stage {
            Stage::Retrieve => {
                let passages = self.retriever.retrieve(state.goal()).await?;
                state.record_passages(passages)
            }
            Stage::Qualify => {
                let passages = state.passages().unwrap_or_default();
                let qualification = self.qualifier.qualify(state.goal(), passages).await?;
                state.record_qualification(qualification)
            }
            Stage::Enrich => {
                let entity_name = required(state.entity_name(), "entity_name")?;
                let enrichment = self.enricher.enrich(entity_name).await;
                state.record_enrichment(enrichment)
            }
            Stage::Draft => {
                let draft = self
                    .drafter
                    .draft(
                        state.goal(),
                        state.passages().unwrap_or_default(),
                        required(state.qualification(), "qualification")?,
                        required(state.enrichment(), "enrichment")?,
                    )
                    .await?;
                state.record_draft(draft)
            }
            Stage::Publish => {
                let publication = self
                    .publisher
                    .publish(
                        required(state.qualification(), "qualification")?,
                        required(state.enrichment(), "enrichment")?,
                        required(state.draft(), "draft")?,
                        required(state.entity_name(), "entity_name")?,
                    )
                    .await;
                state.record_publication(publication.task, publication.notification)
            }
        }
    }
}

/// A field an earlier stage must have written. Missing means the stage order
/// was broken.
fn required<T>(value: Option<T>, field: &str) -> Result<T, ScoutError> {
    value.ok_or_else(|| ScoutError::StateViolation {
        field: field.to_string(),
    })
}
