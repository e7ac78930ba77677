//! Newtype domain identifiers.
//!
//! Destinations on the external providers are plain strings on the wire, but a
//! Trello list id and a Discord channel id must never be swapped by accident.
//! Each one gets its own newtype.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty
            /// or whitespace only.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.trim().is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single pipeline run (one goal, one [`crate::PipelineState`]).
///
/// Generated fresh for every run; recorded on the `pipeline_run` span and in
/// the audit record so all activity from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineRunId(Uuid);

impl PipelineRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for PipelineRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (provider destinations)
// ---------------------------------------------------------------------------

string_id! {
    /// Where the task tracker files new tasks: a Trello list id or a Notion
    /// database id, depending on the configured tracker.
    ///
    /// When absent, the Publisher skips task creation.
    TaskDestinationId
}

string_id! {
    /// A chat channel that receives lead notifications (Discord channel id).
    ///
    /// When absent, the Publisher skips the notification.
    ChannelId
}

string_id! {
    /// The tracker's handle on a created task: a short URL when the tracker
    /// returns one, otherwise its raw id.
    TaskReference
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_ids_reject_blank_values() {
        assert!(TaskDestinationId::new("").is_none());
        assert!(ChannelId::new("   ").is_none());
        assert_eq!(ChannelId::new("123").map(|c| c.to_string()), Some("123".into()));
    }

    #[test]
    fn run_id_serializes_as_bare_uuid() {
        let id = PipelineRunId::new_random();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}
