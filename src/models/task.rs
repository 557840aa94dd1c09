use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Comment, Keyed, KeyedMap, TimeEntry};

/// One top-level task in the aggregated document.
///
/// A record is created the first time its task id is seen in a time entry;
/// later entries for the same task are appended to `time_entries`. `name`,
/// `comments` and `subtasks` are filled in from the task's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub time_entries: Vec<TimeEntry>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub subtasks: KeyedMap<SubtaskRecord>,
}

impl TaskRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            time_entries: Vec::new(),
            comments: Vec::new(),
            subtasks: KeyedMap::new(),
        }
    }

    /// Total tracked time across this task's entries, in milliseconds.
    pub fn tracked_ms(&self) -> u64 {
        self.time_entries.iter().map(TimeEntry::duration_ms).sum()
    }
}

impl Keyed for TaskRecord {
    fn key(&self) -> &str {
        &self.id
    }
}

/// A subtask, owned by the single parent task that declared it.
///
/// Carries the subtask's base fields as returned by the upstream plus its
/// own comment thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtaskRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Keyed for SubtaskRecord {
    fn key(&self) -> &str {
        &self.id
    }
}

/// The aggregated document: `task_id → TaskRecord` in discovery order.
pub type AggregationResult = KeyedMap<TaskRecord>;
