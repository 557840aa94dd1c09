//! Wire envelopes for the ClickUp v2 API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{Comment, SubtaskRecord, TimeEntry, Workspace};

/// `GET /team`
#[derive(Debug, Deserialize)]
pub struct WorkspacesResponse {
    pub teams: Vec<Workspace>,
}

/// `GET /team/{id}/time_entries`
#[derive(Debug, Deserialize)]
pub struct TimeEntriesResponse {
    #[serde(default)]
    pub data: Vec<TimeEntry>,
}

/// `GET /task/{id}/comment`
#[derive(Debug, Deserialize)]
pub struct CommentsResponse {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// `GET /task/{id}/?include_subtasks=true`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDetails {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Subtasks in the order the upstream declares them. Absent when the
    /// task has none.
    #[serde(default)]
    pub subtasks: Vec<SubtaskDetails>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A subtask as listed inside its parent's task payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtaskDetails {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl From<SubtaskDetails> for SubtaskRecord {
    fn from(subtask: SubtaskDetails) -> Self {
        Self {
            id: subtask.id,
            name: subtask.name,
            fields: subtask.fields,
            comments: Vec::new(),
        }
    }
}
