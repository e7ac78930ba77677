//! Prompt and message text built from pipeline state.
//!
//! Everything here is a pure function of its inputs. The language model only
//! ever sees what these functions embed, which is what keeps the draft
//! grounded in the retrieved passages, the qualification and the enrichment.

use serde_json::json;

use crate::ports::OutputSchema;
use crate::{identified_entity, EnrichmentResult, Passage, Qualification, TaskOutcome, NO_ENTITY};

/// Shown in task titles and notifications when no entity was identified.
pub const UNKNOWN_LEAD: &str = "Unknown Lead";

/// Prefix of the draft prompt's contact line when no enrichment data exists.
pub const NO_CONTACT_INFO: &str = "No contact information available.";

/// Concatenates passage text into a single context block.
pub fn join_passages(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Returns the entity name for display, or [`UNKNOWN_LEAD`].
pub fn display_entity(entity_name: &str) -> &str {
    identified_entity(entity_name).unwrap_or(UNKNOWN_LEAD)
}

// ---------------------------------------------------------------------------
// Qualifier
// ---------------------------------------------------------------------------

/// The schema the Qualifier requests from the model.
pub fn qualification_schema() -> OutputSchema {
    OutputSchema {
        name: "lead_qualification".to_string(),
        schema: json!({
            "type": "object",
            "properties": {
                "score": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 10,
                    "description": "Lead quality from 1 to 10, where 10 is the highest."
                },
                "justification": {
                    "type": "string",
                    "description": "Brief analysis of why this is or isn't a good lead."
                },
                "entity_name": {
                    "type": "string",
                    "description": format!(
                        "Name of the company or person, if identifiable. Otherwise '{NO_ENTITY}'."
                    )
                }
            },
            "required": ["score", "justification", "entity_name"]
        }),
    }
}

/// Prompt asking the model to score the passages against the goal.
pub fn qualification_prompt(goal: &str, passages: &[Passage]) -> String {
    format!(
        "You are a business analyst. Your job is to identify high-quality leads in the \
         documents below.\n\
         Analyze them in the context of this goal: '{goal}'\n\n\
         Documents:\n{docs}\n\n\
         Based only on these documents, does this represent a high-quality lead?\n\
         Give a score from 1 to 10, a brief justification, and the name of the company \
         or person behind the opportunity ('{NO_ENTITY}' if none can be identified).",
        docs = join_passages(passages),
    )
}

// ---------------------------------------------------------------------------
// Drafter
// ---------------------------------------------------------------------------

/// The contact line of the draft prompt.
///
/// Successful enrichment is embedded as JSON. Otherwise the line starts with
/// [`NO_CONTACT_INFO`] followed by the serialised marker, so the model knows
/// there is nothing to personalise with.
pub fn contact_context(enrichment: &EnrichmentResult) -> String {
    let serialized = serde_json::to_string(enrichment).unwrap_or_default();
    if enrichment.is_success() {
        serialized
    } else {
        format!("{NO_CONTACT_INFO} {serialized}")
    }
}

/// Prompt for the outreach email. Embeds only the supplied passages,
/// qualification and enrichment.
pub fn draft_prompt(
    goal: &str,
    passages: &[Passage],
    qualification: &Qualification,
    enrichment: &EnrichmentResult,
) -> String {
    format!(
        "You are a friendly business development representative.\n\
         Using only the information below, draft a concise, personalized and \
         non-aggressive outreach email. Reference their specific problem or recent news. \
         Do not invent information that is not present below.\n\n\
         Goal: {goal}\n\
         Original Documents:\n{docs}\n\
         Lead Analysis: {analysis}\n\
         Contact Info: {contact}\n\n\
         Draft the email below:",
        docs = join_passages(passages),
        analysis = serde_json::to_string(qualification).unwrap_or_default(),
        contact = contact_context(enrichment),
    )
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

/// Title of the tracker task for a lead.
pub fn task_title(entity_name: &str) -> String {
    format!("New Lead: {}", display_entity(entity_name))
}

/// Markdown body of the tracker task: the qualification and enrichment as
/// pretty JSON, then the draft.
pub fn task_description(
    qualification: &Qualification,
    enrichment: &EnrichmentResult,
    draft: &str,
) -> String {
    format!(
        "**Lead Analysis:**\n{analysis}\n\n**Enriched Info:**\n{enriched}\n\n**Draft Email:**\n{draft}\n",
        analysis = serde_json::to_string_pretty(qualification).unwrap_or_default(),
        enriched = serde_json::to_string_pretty(enrichment).unwrap_or_default(),
    )
}

/// Channel message announcing a lead and the task outcome.
pub fn notification_message(
    qualification: &Qualification,
    entity_name: &str,
    task: &TaskOutcome,
) -> String {
    let action = match task {
        TaskOutcome::Created { reference } => format!("Task created: {reference}"),
        TaskOutcome::Skipped { reason } => format!("Task not created ({reason})."),
        TaskOutcome::Failed { message } => format!("Task creation failed ({message})."),
    };
    format!(
        "New Opportunity Found: **{entity}**\n- **Score:** {score}\n- **Justification:** {justification}\n- **Action:** {action}",
        entity = display_entity(entity_name),
        score = qualification.score,
        justification = qualification.justification,
    )
}
