//! Human-readable run summaries and the JSON audit file.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use nodes::{RunOutcome, RunReport};
use pipeline::{EnrichmentResult, NotificationOutcome, TaskOutcome};

/// One block of text per run: route taken, each optional step's outcome, and
/// the final result.
pub fn render(report: &RunReport) -> String {
    let state = &report.state;
    let mut out = String::new();

    let _ = writeln!(out, "run {}: {}", state.run_id(), state.goal());

    let route: Vec<&str> = report.completed.iter().map(|s| s.as_str()).collect();
    let route = if route.is_empty() {
        "(none)".to_string()
    } else {
        route.join(" -> ")
    };
    let _ = writeln!(out, "  route:        {route}");

    if let Some(passages) = state.passages() {
        let _ = writeln!(out, "  passages:     {}", passages.len());
    }
    if let Some(q) = state.qualification() {
        let _ = writeln!(out, "  score:        {} ({})", q.score, q.entity_name);
        let _ = writeln!(out, "  why:          {}", q.justification);
    }
    if let Some(enrichment) = state.enrichment() {
        let line = match enrichment {
            EnrichmentResult::Success { data } => format!("ok ({} fields)", data.len()),
            EnrichmentResult::NoEntity => "skipped (no entity identified)".to_string(),
            EnrichmentResult::Error { message } => format!("error: {message}"),
        };
        let _ = writeln!(out, "  enrichment:   {line}");
    }
    if let Some(task) = state.task_reference() {
        let line = match task {
            TaskOutcome::Created { reference } => format!("created {reference}"),
            TaskOutcome::Skipped { reason } => format!("skipped ({reason})"),
            TaskOutcome::Failed { message } => format!("failed: {message}"),
        };
        let _ = writeln!(out, "  task:         {line}");
    }
    if let Some(notification) = state.notification() {
        let line = match notification {
            NotificationOutcome::Sent => "sent".to_string(),
            NotificationOutcome::Skipped { reason } => format!("skipped ({reason})"),
            NotificationOutcome::Failed { message } => format!("failed: {message}"),
        };
        let _ = writeln!(out, "  notification: {line}");
    }

    let outcome = match &report.outcome {
        RunOutcome::Published => "published".to_string(),
        RunOutcome::NotActionable => "not actionable".to_string(),
        RunOutcome::Failed { error } => format!("FAILED: {error}"),
    };
    let _ = writeln!(out, "  outcome:      {outcome}");
    out
}

/// Writes every report as a pretty JSON array.
pub fn write_audit(path: &Path, reports: &[RunReport]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(reports).context("failed to serialise audit")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write audit file {}", path.display()))
}
