use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single recorded interval of work logged against a task.
///
/// Only the fields the aggregation needs are typed; everything else the
/// upstream returns is kept in `fields` so the emitted document is lossless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: String,
    /// The task this entry was logged against. Absent for untracked entries.
    #[serde(default)]
    pub task: Option<TaskRef>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Back-reference from a time entry to its task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl TimeEntry {
    pub fn task_id(&self) -> Option<&str> {
        self.task.as_ref().map(|t| t.id.as_str())
    }

    /// Tracked duration in milliseconds.
    ///
    /// ClickUp sends durations as stringified integers; running timers are
    /// negative and count as zero.
    pub fn duration_ms(&self) -> u64 {
        let raw = match self.fields.get("duration") {
            Some(Value::String(s)) => s.parse::<i64>().ok(),
            Some(Value::Number(n)) => n.as_i64(),
            _ => None,
        };
        raw.map(|ms| ms.max(0) as u64).unwrap_or(0)
    }
}
