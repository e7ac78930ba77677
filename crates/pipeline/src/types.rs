//! Shared value types for the scout pipeline.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! values with invariants (a lead score is always in `1..=10`) and are the
//! payloads each stage writes into [`crate::PipelineState`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::TaskReference;

/// Entity name the language model returns when no company or person can be
/// identified from the passages.
pub const NO_ENTITY: &str = "N/A";

// ---------------------------------------------------------------------------
// Retrieval
// ---------------------------------------------------------------------------

/// A unit of retrieved text plus the metadata the search backend stored with it
/// (source URL, feed title, ingest timestamp, similarity score, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// The passage text.
    pub text: String,

    /// Source metadata, passed through untouched.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Passage {
    /// Creates a passage with no metadata.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: Map::new(),
        }
    }

    /// Adds one metadata entry, replacing any previous value under `key`.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Qualification
// ---------------------------------------------------------------------------

/// Lead quality score in the range `[1, 10]`, 10 being the best.
///
/// Deserialisation goes through [`LeadScore::new`], so an out-of-range value in
/// a model response fails to parse instead of producing an invalid score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct LeadScore(u8);

impl LeadScore {
    /// Lowest valid score.
    pub const MIN: u8 = 1;
    /// Highest valid score.
    pub const MAX: u8 = 10;

    /// Creates a [`LeadScore`], returning `None` if `value` is outside `[1, 10]`.
    #[must_use]
    pub fn new(value: i64) -> Option<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            u8::try_from(value).ok().map(Self)
        } else {
            None
        }
    }

    /// Returns the score as a `u8` in `[1, 10]`.
    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for LeadScore {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| {
            format!(
                "score {value} is outside the range {}..={}",
                Self::MIN,
                Self::MAX
            )
        })
    }
}

impl From<LeadScore> for u8 {
    fn from(score: LeadScore) -> Self {
        score.0
    }
}

impl std::fmt::Display for LeadScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// The Qualifier's verdict on the retrieved passages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualification {
    /// Lead quality, compared against [`crate::ACTIONABLE_SCORE_THRESHOLD`].
    pub score: LeadScore,

    /// Brief analysis explaining the score.
    pub justification: String,

    /// Company or person behind the opportunity, or [`NO_ENTITY`].
    ///
    /// Older model prompts called this field `company_name`; both spellings
    /// are accepted on input.
    #[serde(alias = "company_name")]
    pub entity_name: String,
}

impl Qualification {
    /// Creates a new qualification.
    pub fn new(
        score: LeadScore,
        justification: impl Into<String>,
        entity_name: impl Into<String>,
    ) -> Self {
        Self {
            score,
            justification: justification.into(),
            entity_name: entity_name.into(),
        }
    }

    /// Returns the entity name when one was identified.
    ///
    /// `None` for [`NO_ENTITY`] (any case) and for blank names.
    pub fn identified_entity(&self) -> Option<&str> {
        identified_entity(&self.entity_name)
    }
}

/// Returns `name` trimmed, or `None` when it is blank or the [`NO_ENTITY`] marker.
pub fn identified_entity(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NO_ENTITY) {
        None
    } else {
        Some(trimmed)
    }
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// What the Enricher learned about the entity.
///
/// Serialises with a `status` tag, e.g. `{"status":"error","message":"..."}`,
/// which is the form embedded in the draft prompt and task description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnrichmentResult {
    /// The provider returned company/contact fields.
    Success {
        /// Provider fields, passed through untouched.
        data: Map<String, Value>,
    },

    /// No entity was identified, so no lookup was made.
    NoEntity,

    /// The lookup failed or could not be attempted. The run continues
    /// without contact data.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

impl EnrichmentResult {
    /// Creates an error marker.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Returns the provider fields when the lookup succeeded.
    pub fn data(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Success { data } => Some(data),
            Self::NoEntity | Self::Error { .. } => None,
        }
    }

    /// Returns `true` if contact data is available.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

// ---------------------------------------------------------------------------
// Publishing
// ---------------------------------------------------------------------------

/// Outcome of the Publisher's task-creation side effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// The tracker created the task.
    Created {
        /// URL or id of the new task.
        reference: TaskReference,
    },

    /// Task creation was not attempted (no destination configured).
    Skipped {
        /// Why the step was skipped.
        reason: String,
    },

    /// Task creation was attempted, or required, and failed.
    Failed {
        /// Human-readable failure description.
        message: String,
    },
}

impl TaskOutcome {
    /// Returns the task reference when a task was created.
    pub fn reference(&self) -> Option<&TaskReference> {
        match self {
            Self::Created { reference } => Some(reference),
            Self::Skipped { .. } | Self::Failed { .. } => None,
        }
    }
}

/// Outcome of the Publisher's chat-notification side effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationOutcome {
    /// The message was posted.
    Sent,

    /// No notification channel is configured.
    Skipped {
        /// Why the step was skipped.
        reason: String,
    },

    /// Posting failed.
    Failed {
        /// Human-readable failure description.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lead_score_accepts_only_one_to_ten() {
        assert!(LeadScore::new(0).is_none());
        assert!(LeadScore::new(11).is_none());
        assert!(LeadScore::new(-3).is_none());
        assert_eq!(LeadScore::new(1).map(LeadScore::as_u8), Some(1));
        assert_eq!(LeadScore::new(10).map(LeadScore::as_u8), Some(10));
    }

    #[test]
    fn qualification_survives_serialization() {
        let original = Qualification::new(LeadScore::new(9).unwrap(), "strong fit", "Acme");
        let json = serde_json::to_string(&original).unwrap();
        let parsed: Qualification = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
        assert_eq!(parsed.score.as_u8(), 9);
        assert_eq!(parsed.justification, "strong fit");
        assert_eq!(parsed.entity_name, "Acme");
    }

    #[test]
    fn qualification_rejects_out_of_range_score() {
        let err = serde_json::from_value::<Qualification>(json!({
            "score": 12,
            "justification": "too keen",
            "entity_name": "Acme"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("outside the range"));
    }

    #[test]
    fn qualification_accepts_company_name_alias() {
        let parsed: Qualification = serde_json::from_value(json!({
            "score": 8,
            "justification": "hiring",
            "company_name": "Globex"
        }))
        .unwrap();
        assert_eq!(parsed.entity_name, "Globex");
    }

    #[test]
    fn identified_entity_filters_markers() {
        assert_eq!(identified_entity("N/A"), None);
        assert_eq!(identified_entity("n/a"), None);
        assert_eq!(identified_entity("  "), None);
        assert_eq!(identified_entity(" Acme Corp "), Some("Acme Corp"));
    }

    #[test]
    fn enrichment_error_uses_status_tag() {
        let value = serde_json::to_value(EnrichmentResult::error("no key")).unwrap();
        assert_eq!(value, json!({"status": "error", "message": "no key"}));

        let value = serde_json::to_value(EnrichmentResult::NoEntity).unwrap();
        assert_eq!(value, json!({"status": "no_entity"}));
    }

    #[test]
    fn passage_metadata_is_omitted_when_empty() {
        let value = serde_json::to_value(Passage::new("hello")).unwrap();
        assert_eq!(value, json!({"text": "hello"}));

        let passage = Passage::new("hello").with_metadata("source", "rss");
        assert_eq!(passage.metadata.get("source"), Some(&json!("rss")));
    }
}
