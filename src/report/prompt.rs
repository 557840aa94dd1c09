use chrono::SecondsFormat;

use crate::models::{AggregationResult, TimeWindow};

/// Fixed instructions sent ahead of the task data.
pub const INSTRUCTIONS: &str = "\
You are writing a weekly status report for a client from a team's time-tracking data.

The data below maps each task id to a task record with its name, the time entries \
logged against it, its comments, and its subtasks (each with their own comments). \
Durations and timestamps are epoch milliseconds.

Write the report in Markdown:
- Start with a two or three sentence summary of the period.
- Then one section per task that had activity: what was done, total time spent, \
and any decisions, blockers or open questions raised in the comments.
- Mention subtasks under their parent task.
- Do not invent work that is not in the data.";

/// Build the full prompt for one document.
///
/// When a window is given, its bounds are stated in both epoch milliseconds
/// and RFC 3339 so the model can ignore activity outside it.
pub fn build_prompt(
    tasks: &AggregationResult,
    window: Option<&TimeWindow>,
) -> Result<String, serde_json::Error> {
    let document = serde_json::to_string_pretty(tasks)?;

    let period = match window {
        Some(w) => format!(
            "Report only on time entries and comments dated from {} ({}) to {} ({}) inclusive.",
            w.start().to_rfc3339_opts(SecondsFormat::Secs, true),
            w.start_ms,
            w.end().to_rfc3339_opts(SecondsFormat::Secs, true),
            w.end_ms,
        ),
        None => "Report on all recorded activity.".to_string(),
    };

    Ok(format!(
        "{}\n\n## Reporting window\n\n{}\n\n## Task data\n\n```json\n{}\n```\n",
        INSTRUCTIONS, period, document
    ))
}
