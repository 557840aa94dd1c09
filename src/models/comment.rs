use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A comment on a task or subtask, in the order the upstream returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: String,
    /// Plain-text rendering of the comment body.
    #[serde(default)]
    pub comment_text: String,
    /// Creation time as epoch milliseconds (stringified upstream).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}
