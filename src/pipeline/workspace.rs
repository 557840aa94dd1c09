use thiserror::Error;

use crate::models::Workspace;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No workspaces are available to this API key")]
    NoWorkspaces,

    #[error("No workspace named {target:?} (available: {})", .available.join(", "))]
    NoMatch {
        target: String,
        available: Vec<String>,
    },

    #[error(
        "Multiple workspaces available ({}); set CLICKUP_WORKSPACE to choose one",
        .available.join(", ")
    )]
    Ambiguous { available: Vec<String> },
}

/// Pick the workspace a run reports on.
///
/// A single available workspace is always selected, whatever `target` says.
/// With several, the first whose name equals `target` exactly wins.
pub fn resolve_workspace(
    mut workspaces: Vec<Workspace>,
    target: Option<&str>,
) -> Result<Workspace, ResolveError> {
    if workspaces.len() <= 1 {
        return workspaces.pop().ok_or(ResolveError::NoWorkspaces);
    }

    if let Some(target) = target {
        if let Some(i) = workspaces.iter().position(|w| w.name == target) {
            return Ok(workspaces.swap_remove(i));
        }
    }

    let available = workspaces.into_iter().map(|w| w.name).collect();
    match target {
        Some(target) => Err(ResolveError::NoMatch {
            target: target.to_string(),
            available,
        }),
        None => Err(ResolveError::Ambiguous { available }),
    }
}
