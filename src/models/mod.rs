//! Domain models for timesheet digests.
//!
//! # Core Concepts
//!
//! ## Upstream Records
//!
//! - [`Workspace`]: Authorization scope in ClickUp (a "team" on the wire). One is
//!   selected per run.
//! - [`TimeEntry`]: A recorded interval of work logged against a task.
//! - [`Comment`]: A comment on a task or subtask, kept as returned.
//!
//! ## Aggregated Document
//!
//! These exist only for one aggregation run and are discarded once the
//! document has been written:
//!
//! - [`TaskRecord`]: One top-level task with its time entries, comments and subtasks.
//! - [`SubtaskRecord`]: A subtask owned by exactly one [`TaskRecord`].
//! - [`AggregationResult`]: Ordered `task_id → TaskRecord` mapping.
//!
//! [`TimeWindow`] scopes which time entries are requested.

mod comment;
mod keyed;
mod task;
mod time_entry;
mod window;
mod workspace;

pub use comment::*;
pub use keyed::*;
pub use task::*;
pub use time_entry::*;
pub use window::*;
pub use workspace::*;
