//! Task reconciliation and ranking.
//!
//! Merges a local and a remote task collection into one canonical
//! collection plus the write-back actions each side needs, and ranks tasks
//! by an importance score. Everything here is synchronous and pure except
//! for [`sync`], which drives a pair of [`TaskStore`]s.

pub mod merge;
pub mod parser;
pub mod priority;
pub mod sync;

pub use merge::{ConflictResolution, MergeResult, merge_task_lists, resolve_task_conflict};
pub use parser::parse_task_from_text;
pub use priority::{
    DEFAULT_TOP_LIMIT, calculate_task_score, score_tasks, sort_by_importance, top_priority,
};
pub use sync::{MemoryStore, SyncReport, TaskStore, synchronize};

use thiserror::Error;

/// Errors that can occur during task operations.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Two tasks with different ids were handed to the conflict resolver.
    #[error("cannot merge task {local} with task {remote}")]
    IdMismatch {
        /// Id of the local task.
        local: String,
        /// Id of the remote task.
        remote: String,
    },
    /// Task title cannot be empty.
    #[error("task title cannot be empty")]
    TitleEmpty,
    /// Task title exceeds the maximum length.
    #[error("task title too long (max 256 characters)")]
    TitleTooLong,
    /// A quick-add pattern failed to compile.
    #[error("invalid parser pattern: {0}")]
    Pattern(#[from] regex::Error),
    /// A task store could not load or save.
    #[error("task store error: {0}")]
    Store(String),
}
