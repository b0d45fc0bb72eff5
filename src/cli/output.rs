//! CLI output formatting

use crate::{
    core::{RunStatus, StepRecord},
    execution::ExecutionEvent,
    persistence::RunRecord,
};
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Format a run status for display
pub fn format_status(status: RunStatus) -> String {
    match status {
        RunStatus::Queued => style("QUEUED").dim().to_string(),
        RunStatus::Running => style("RUNNING").yellow().to_string(),
        RunStatus::Completed => style("COMPLETED").green().to_string(),
        RunStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// One-line summary of a run record
pub fn format_run_summary(record: &RunRecord) -> String {
    let status_icon = match record.status {
        RunStatus::Completed => CHECK,
        RunStatus::Failed => CROSS,
        RunStatus::Running => SPINNER,
        RunStatus::Queued => INFO,
    };

    let capped = if record.capped {
        style(" (step cap)").yellow().to_string()
    } else {
        String::new()
    };

    format!(
        "{} {} - {} - {} - {} steps{} - {}",
        status_icon,
        style(&record.run_id.to_string()[..8]).dim(),
        style(&record.workflow).bold(),
        format_status(record.status),
        style(record.logs.len()).cyan(),
        capped,
        style(record.created_at.format("%Y-%m-%d %H:%M:%S")).dim()
    )
}

/// Format a log entry for display
pub fn format_step_record(record: &StepRecord) -> String {
    let fields: Vec<&str> = record.state_snapshot.keys().map(String::as_str).collect();
    format!(
        "  {:>3}. {} {}",
        record.step,
        style(&record.node).cyan(),
        style(format!("[{}]", fields.join(", "))).dim()
    )
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::RunStarted { graph, entry_point } => format!(
            "{} Starting {} at {}",
            ROCKET,
            style(graph).bold(),
            style(entry_point.as_deref().unwrap_or("<none>")).cyan()
        ),
        ExecutionEvent::NodeStarted { step, node } => {
            format!("{} [{}] {}", SPINNER, style(step).dim(), style(node).cyan())
        }
        ExecutionEvent::NodeMissing { step, node } => format!(
            "{} [{}] {} is not registered, stopping",
            WARN,
            style(step).dim(),
            style(node).yellow()
        ),
        ExecutionEvent::NodeCompleted {
            step,
            node,
            next_node,
        } => match next_node {
            Some(next) => format!(
                "{} [{}] {} → {}",
                CHECK,
                style(step).dim(),
                style(node).green(),
                style(next).cyan()
            ),
            None => format!(
                "{} [{}] {} (end)",
                CHECK,
                style(step).dim(),
                style(node).green()
            ),
        },
        ExecutionEvent::RunCompleted {
            graph,
            steps,
            capped,
        } => {
            if *capped {
                format!(
                    "{} {} stopped at the step cap after {} steps",
                    WARN,
                    style(graph).bold(),
                    style(steps).yellow()
                )
            } else {
                format!(
                    "{} {} finished in {} steps",
                    INFO,
                    style(graph).bold(),
                    style(steps).cyan()
                )
            }
        }
    }
}
