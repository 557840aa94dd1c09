//! ASCII tree rendering for an aggregated document.

use crate::models::{AggregationResult, SubtaskRecord, TaskRecord};

const UNNAMED: &str = "(unnamed)";

/// Render every task with its subtasks as ASCII art.
///
/// Example output:
/// ```text
/// Checkout flow [86a1] · 3 entries · 2h 15m · 4 comments
/// ├── Payment form [86a2] · 1 comment
/// └── Receipt email [86a3] · 0 comments
/// ```
pub fn render_tree(tasks: &AggregationResult) -> String {
    let mut output = String::new();
    for task in tasks {
        render_task(&mut output, task);
    }
    output
}

fn render_task(output: &mut String, task: &TaskRecord) {
    output.push_str(&format!(
        "{} [{}] · {} · {} · {}\n",
        display_name(&task.name),
        task.id,
        plural(task.time_entries.len(), "entry", "entries"),
        format_duration(task.tracked_ms()),
        plural(task.comments.len(), "comment", "comments"),
    ));

    let count = task.subtasks.len();
    for (i, subtask) in task.subtasks.iter().enumerate() {
        let branch = if i == count - 1 { "└── " } else { "├── " };
        output.push_str(branch);
        render_subtask(output, subtask);
    }
}

fn render_subtask(output: &mut String, subtask: &SubtaskRecord) {
    output.push_str(&format!(
        "{} [{}] · {}\n",
        display_name(&subtask.name),
        subtask.id,
        plural(subtask.comments.len(), "comment", "comments"),
    ));
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        UNNAMED
    } else {
        name
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

/// Format milliseconds as `Hh MMm`, or `Mm` under an hour.
pub fn format_duration(ms: u64) -> String {
    let minutes = ms / 60_000;
    let (h, m) = (minutes / 60, minutes % 60);
    if h == 0 {
        format!("{}m", m)
    } else {
        format!("{}h {:02}m", h, m)
    }
}
