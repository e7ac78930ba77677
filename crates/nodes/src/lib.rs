//! Stage implementations and the pipeline driver.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Stages sequence calls between the domain rules in
//! the [`pipeline`] crate and the port traits it defines. They hold no domain
//! rules of their own and never touch HTTP directly.
//!
//! | Stage | Remote call | Failure |
//! |-------|-------------|---------|
//! | [`Retriever`] | search backend | fatal |
//! | [`Qualifier`] | language model, structured | fatal |
//! | [`Enricher`] | enrichment provider | degrades to an error marker |
//! | [`Drafter`] | language model, free text | fatal |
//! | [`Publisher`] | task tracker, chat | degrades to skipped/failed outcomes |
//!
//! [`PipelineExecutor`] runs them in order and applies the branch after
//! qualification.

mod drafter;
mod enricher;
mod executor;
mod publisher;
mod qualifier;
mod retriever;
mod retry;

#[cfg(test)]
mod fakes;

pub use drafter::{Drafter, DEFAULT_DRAFT_TEMPERATURE};
pub use enricher::Enricher;
pub use executor::{PipelineExecutor, RunOutcome, RunReport};
pub use publisher::{Publication, Publisher, PublisherConfig, NO_NOTIFY_CHANNEL, NO_TASK_DESTINATION};
pub use qualifier::{Qualifier, DEFAULT_QUALIFY_TEMPERATURE};
pub use retriever::Retriever;
pub use retry::RetryConfig;
