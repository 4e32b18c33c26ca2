//! Shared task model and snapshot format for `tasksync`.

pub mod codec;
pub mod task;

pub use task::{MAX_TASK_TITLE_LENGTH, Priority, Task, TaskId, TaskPatch, TaskStatus};

/// A task collection keyed by id, one per source.
pub type TaskCollection = std::collections::HashMap<TaskId, Task>;
