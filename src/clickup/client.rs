//! HTTP client for the ClickUp v2 API.
//!
//! Only the four read endpoints the digest needs are wrapped. Any non-2xx
//! response is surfaced as [`ClientError::Upstream`] with the status code and
//! the kind of endpoint that failed; nothing is retried.

use std::fmt;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::types::*;
use crate::config::ClickUpConfig;
use crate::models::*;

/// Default base URL for the hosted API.
pub const DEFAULT_URL: &str = "https://api.clickup.com/api/v2";

/// Which upstream endpoint a request went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Workspaces,
    TimeEntries,
    Task,
    Comments,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workspaces => "workspaces",
            Self::TimeEntries => "time entries",
            Self::Task => "task",
            Self::Comments => "comments",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ClickUp client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed retrieving {endpoint} with status code: {}", .status.as_u16())]
    Upstream {
        status: StatusCode,
        endpoint: Endpoint,
        body: String,
    },
}

impl ClientError {
    /// Status code of a non-2xx upstream response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
        }
    }

    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            Self::Upstream { endpoint, .. } => Some(*endpoint),
            Self::Http(_) => None,
        }
    }
}

/// HTTP client for the ClickUp API.
#[derive(Debug, Clone)]
pub struct ClickUpClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl ClickUpClient {
    /// Create with explicit configuration.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &ClickUpConfig) -> Self {
        Self::new(&config.base_url, &config.api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a GET request with the personal token attached.
    fn get(&self, endpoint: Endpoint, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%endpoint, %path, "ClickUp request");
        self.client
            .get(&url)
            .header(AUTHORIZATION, &self.api_key)
            .header(ACCEPT, "application/json")
    }

    /// Handle response, converting non-2xx statuses to ClientError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%endpoint, status = status.as_u16(), "ClickUp request failed");
            Err(ClientError::Upstream {
                status,
                endpoint,
                body,
            })
        }
    }

    /// List the workspaces the token is authorized for.
    pub async fn list_workspaces(&self) -> Result<Vec<Workspace>, ClientError> {
        let response = self.get(Endpoint::Workspaces, "/team").send().await?;
        let body: WorkspacesResponse = self
            .handle_response(Endpoint::Workspaces, response)
            .await?;
        Ok(body.teams)
    }

    /// List time entries for a workspace, optionally bounded by `window`.
    ///
    /// Window bounds go to the upstream query unchanged.
    pub async fn list_time_entries(
        &self,
        workspace_id: &str,
        window: Option<&TimeWindow>,
    ) -> Result<Vec<TimeEntry>, ClientError> {
        let mut req = self.get(
            Endpoint::TimeEntries,
            &format!("/team/{}/time_entries", workspace_id),
        );
        if let Some(w) = window {
            req = req.query(&[("start_date", w.start_ms), ("end_date", w.end_ms)]);
        }
        let response = req.send().await?;
        let body: TimeEntriesResponse = self
            .handle_response(Endpoint::TimeEntries, response)
            .await?;
        Ok(body.data)
    }

    /// Get a task by ID, including its declared subtasks.
    pub async fn get_task(&self, task_id: &str) -> Result<TaskDetails, ClientError> {
        let response = self
            .get(Endpoint::Task, &format!("/task/{}/", task_id))
            .query(&[("include_subtasks", "true")])
            .send()
            .await?;
        self.handle_response(Endpoint::Task, response).await
    }

    /// Get the comment thread of a task or subtask.
    pub async fn get_comments(&self, task_id: &str) -> Result<Vec<Comment>, ClientError> {
        let response = self
            .get(Endpoint::Comments, &format!("/task/{}/comment", task_id))
            .send()
            .await?;
        let body: CommentsResponse = self.handle_response(Endpoint::Comments, response).await?;
        Ok(body.comments)
    }
}
