//! Stage names and the transition function of the pipeline state machine.
//!
//! ```text
//! START -> Retrieve -> Qualify -> [branch]
//!   score > 7  -> Enrich -> Draft -> Publish -> END
//!   score <= 7 -> END
//! ```
//!
//! No stage is re-entered and nothing outside the run can trigger a
//! transition; [`next_route`] is the only place the graph is encoded.

use serde::{Deserialize, Serialize};

use crate::{LeadScore, PipelineState, Qualification};

/// A qualification is actionable when its score is strictly greater than
/// this value. Shared by every pipeline variant; not configurable.
pub const ACTIONABLE_SCORE_THRESHOLD: u8 = 7;

/// Returns `true` if `score` clears [`ACTIONABLE_SCORE_THRESHOLD`].
pub fn is_actionable(score: LeadScore) -> bool {
    score.as_u8() > ACTIONABLE_SCORE_THRESHOLD
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// The five pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Query the search backend with the goal.
    Retrieve,
    /// Score the passages with the language model.
    Qualify,
    /// Look up company/contact data for the identified entity.
    Enrich,
    /// Write the outreach draft with the language model.
    Draft,
    /// File the task and send the notification.
    Publish,
}

impl Stage {
    /// The entry point of every run.
    pub const FIRST: Stage = Stage::Retrieve;

    /// Stable lowercase name, used in span names and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve",
            Self::Qualify => "qualify",
            Self::Enrich => "enrich",
            Self::Draft => "draft",
            Self::Publish => "publish",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// What the driver does after a stage completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", content = "stage", rename_all = "snake_case")]
pub enum Route {
    /// Run the given stage next.
    Continue(Stage),
    /// The run is over.
    Terminate,
}

/// Branch policy applied after the Qualifier.
pub fn route_after_qualification(qualification: &Qualification) -> Route {
    if is_actionable(qualification.score) {
        Route::Continue(Stage::Enrich)
    } else {
        Route::Terminate
    }
}

/// Returns the route out of `completed`, given the state it left behind.
///
/// After [`Stage::Qualify`] the decision reads the recorded qualification; a
/// missing qualification terminates the run.
pub fn next_route(completed: Stage, state: &PipelineState) -> Route {
    match completed {
        Stage::Retrieve => Route::Continue(Stage::Qualify),
        Stage::Qualify => state
            .qualification()
            .map_or(Route::Terminate, route_after_qualification),
        Stage::Enrich => Route::Continue(Stage::Draft),
        Stage::Draft => Route::Continue(Stage::Publish),
        Stage::Publish => Route::Terminate,
    }
}
