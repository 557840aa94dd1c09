//! Task aggregation: group time entries by task, then enrich every task with
//! its metadata, comments, subtasks and subtask comments.
//!
//! ```text
//!   entries ──group──▶ [t1, t2, t3]          (discovery order)
//!                         │
//!         sequential, or JoinSet × N workers (Semaphore-bounded)
//!                         │
//!   get_task ─▶ get_comments ─▶ per subtask: get_comments
//!                         │
//!   merge enrichments back in discovery order ──▶ AggregationResult
//! ```
//!
//! Any failed fetch aborts the whole aggregation; no partial result escapes.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::PipelineError;
use crate::clickup::{ClickUpClient, ClientError};
use crate::models::*;

pub struct Aggregator {
    client: ClickUpClient,
    concurrency: usize,
}

impl Aggregator {
    /// Sequential aggregator: one request in flight at a time.
    pub fn new(client: ClickUpClient) -> Self {
        Self {
            client,
            concurrency: 1,
        }
    }

    /// Enrich up to `concurrency` tasks at once. Values below 2 stay sequential.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn aggregate(&self, entries: Vec<TimeEntry>) -> Result<AggregationResult, PipelineError> {
        let mut tasks = group_entries(entries);
        info!(
            tasks = tasks.len(),
            concurrency = self.concurrency,
            "enriching tasks"
        );

        if self.concurrency == 1 {
            for record in tasks.iter_mut() {
                let enrichment = enrich_task(&self.client, &record.id).await?;
                enrichment.apply(record);
            }
        } else {
            self.enrich_concurrently(&mut tasks).await?;
        }

        Ok(tasks)
    }

    async fn enrich_concurrently(&self, tasks: &mut AggregationResult) -> Result<(), PipelineError> {
        let sem = Arc::new(Semaphore::new(self.concurrency));
        let mut join_set: JoinSet<(usize, Result<Enrichment, ClientError>)> = JoinSet::new();

        for (i, task_id) in tasks.keys().enumerate() {
            let sem = sem.clone();
            let client = self.client.clone();
            let task_id = task_id.to_string();

            join_set.spawn(async move {
                let _permit = sem.acquire_owned().await;
                (i, enrich_task(&client, &task_id).await)
            });
        }

        let mut enrichments: Vec<Option<Enrichment>> = (0..tasks.len()).map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            let (i, result) = joined?;
            match result {
                Ok(enrichment) => enrichments[i] = Some(enrichment),
                Err(e) => {
                    join_set.abort_all();
                    return Err(e.into());
                }
            }
        }

        for (record, enrichment) in tasks.iter_mut().zip(enrichments) {
            if let Some(enrichment) = enrichment {
                enrichment.apply(record);
            }
        }
        Ok(())
    }
}

/// Partition entries by task id, keeping first-seen order of tasks and the
/// original relative order of entries within each task.
///
/// Entries without a task reference cannot be attributed and are dropped.
pub fn group_entries(entries: Vec<TimeEntry>) -> AggregationResult {
    let mut tasks = AggregationResult::new();
    for entry in entries {
        let Some(task_id) = entry.task_id().map(str::to_string) else {
            warn!(entry_id = %entry.id, "skipping time entry without a task");
            continue;
        };
        tasks
            .get_or_insert_with(&task_id, || TaskRecord::new(task_id.clone()))
            .time_entries
            .push(entry);
    }
    tasks
}

/// Everything fetched for one task, owned by the worker that fetched it.
struct Enrichment {
    name: String,
    comments: Vec<Comment>,
    subtasks: KeyedMap<SubtaskRecord>,
}

impl Enrichment {
    fn apply(self, record: &mut TaskRecord) {
        record.name = self.name;
        record.comments = self.comments;
        record.subtasks = self.subtasks;
    }
}

async fn enrich_task(client: &ClickUpClient, task_id: &str) -> Result<Enrichment, ClientError> {
    let details = client.get_task(task_id).await?;
    let comments = client.get_comments(task_id).await?;

    let mut subtasks = KeyedMap::new();
    for subtask in details.subtasks {
        if subtasks.contains_key(&subtask.id) {
            debug!(task_id, subtask_id = %subtask.id, "duplicate subtask reference");
            continue;
        }
        let mut record = SubtaskRecord::from(subtask);
        record.comments = client.get_comments(&record.id).await?;
        subtasks.insert_if_absent(record);
    }

    debug!(
        task_id,
        comments = comments.len(),
        subtasks = subtasks.len(),
        "task enriched"
    );

    Ok(Enrichment {
        name: details.name,
        comments,
        subtasks,
    })
}
