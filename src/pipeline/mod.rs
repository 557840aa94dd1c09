//! The aggregation pipeline and the run that wraps it.
//!
//! `collect` = resolve workspace → fetch time entries → aggregate tasks.
//! `run` additionally writes the document and, only after that has
//! succeeded, asks the generator for a report.

mod aggregate;
mod workspace;

use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, info};

pub use aggregate::{group_entries, Aggregator};
pub use workspace::{resolve_workspace, ResolveError};

use crate::clickup::{ClickUpClient, ClientError};
use crate::config::Config;
use crate::models::*;
use crate::report::{self, GeminiClient, GenerationError};
use crate::store::SnapshotStore;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Aggregation worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Output of one aggregation run.
#[derive(Debug, Clone)]
pub struct Collected {
    pub workspace: Workspace,
    pub window: Option<TimeWindow>,
    pub tasks: AggregationResult,
}

pub struct Pipeline {
    client: ClickUpClient,
    workspace_name: Option<String>,
    concurrency: usize,
}

impl Pipeline {
    pub fn new(client: ClickUpClient) -> Self {
        Self {
            client,
            workspace_name: None,
            concurrency: 1,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(ClickUpClient::from_config(&config.clickup))
            .with_workspace_name(config.workspace_name.clone())
            .with_concurrency(config.concurrency)
    }

    pub fn with_workspace_name(mut self, name: Option<String>) -> Self {
        self.workspace_name = name;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub async fn resolve_workspace(&self) -> Result<Workspace, PipelineError> {
        let workspaces = self.client.list_workspaces().await?;
        let workspace = resolve_workspace(workspaces, self.workspace_name.as_deref())?;
        info!(id = %workspace.id, name = %workspace.name, "workspace resolved");
        Ok(workspace)
    }

    pub async fn collect(&self, window: Option<TimeWindow>) -> Result<Collected, PipelineError> {
        let workspace = self.resolve_workspace().await?;

        let entries = self
            .client
            .list_time_entries(&workspace.id, window.as_ref())
            .await?;
        info!(entries = entries.len(), "time entries retrieved");

        let tasks = Aggregator::new(self.client.clone())
            .with_concurrency(self.concurrency)
            .aggregate(entries)
            .await?;
        info!(tasks = tasks.len(), "tasks aggregated");

        Ok(Collected {
            workspace,
            window,
            tasks,
        })
    }
}

/// Result of a full run.
#[derive(Debug)]
pub struct RunSummary {
    pub collected: Collected,
    pub document: PathBuf,
    /// `None` when no generator was supplied.
    pub report: Option<Result<Report, GenerationError>>,
}

/// A generated report and where it was stored.
#[derive(Debug, Clone)]
pub struct Report {
    pub text: String,
    pub path: PathBuf,
}

/// Collect, emit the document, then request a report.
///
/// A collect failure returns before anything is written. A generation
/// failure is reported in [`RunSummary::report`] and leaves the document in
/// place.
pub async fn run(
    pipeline: &Pipeline,
    store: &SnapshotStore,
    generator: Option<&GeminiClient>,
    window: Option<TimeWindow>,
) -> anyhow::Result<RunSummary> {
    let collected = pipeline.collect(window).await?;
    let document = store.write_document(&collected.tasks)?;

    let report = match generator {
        Some(generator) => Some(generate(generator, store, &collected.tasks, window).await?),
        None => None,
    };

    Ok(RunSummary {
        collected,
        document,
        report,
    })
}

/// Generate and store a report for an already-written document.
///
/// The outer error is a storage failure; the inner one is the generator's.
pub async fn generate(
    generator: &GeminiClient,
    store: &SnapshotStore,
    tasks: &AggregationResult,
    window: Option<TimeWindow>,
) -> anyhow::Result<Result<Report, GenerationError>> {
    let text = match report::request_report(generator, tasks, window.as_ref()).await {
        Ok(text) => text,
        Err(e) => {
            error!(error = %e, "report generation failed; document kept");
            return Ok(Err(e));
        }
    };
    let path = store.write_report(&text)?;
    Ok(Ok(Report { text, path }))
}
