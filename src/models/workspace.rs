use serde::{Deserialize, Serialize};

/// A ClickUp workspace (a "team" in the v2 API).
///
/// Exactly one workspace is selected per run and stays fixed for its duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
}
