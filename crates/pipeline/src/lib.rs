//! Core domain for the opportunity scout pipeline.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, error type and port trait used throughout the workspace.
//! Infrastructure crates implement the ports defined here; they never add
//! domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`PipelineRunId`, `TaskDestinationId`, etc.) |
//! | [`types`] | Stage payloads (`Passage`, `Qualification`, `EnrichmentResult`, etc.) |
//! | [`state`] | The write-once [`PipelineState`] record |
//! | [`routing`] | [`Stage`], [`Route`] and the branch policy |
//! | [`prompts`] | Prompt, task and notification text |
//! | [`ports`] | Traits for the search backend, language model and SaaS providers |
//! | [`errors`] | Run-level error and retry-policy types |

pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod prompts;
pub mod routing;
pub mod state;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{RetryPolicy, ScoutError};
pub use identifiers::{ChannelId, PipelineRunId, TaskDestinationId, TaskReference};
pub use routing::{
    is_actionable, next_route, route_after_qualification, Route, Stage,
    ACTIONABLE_SCORE_THRESHOLD,
};
pub use state::PipelineState;
pub use types::{
    identified_entity, EnrichmentResult, LeadScore, NotificationOutcome, Passage, Qualification,
    TaskOutcome, Timestamp, NO_ENTITY,
};
