//! Two-way synchronization between a local and a remote task store.
//!
//! [`synchronize`] loads both sides, runs [`merge_task_lists`], and writes
//! each action set back to the side that needs it:
//! `create_local` + `update_local` go to the local store,
//! `create_remote` + `update_remote` to the remote store.

use tasksync_proto::{Task, TaskCollection, TaskId};
use tracing::{debug, info};

use super::TaskError;
use super::merge::merge_task_lists;

/// A source of tasks that can be loaded in full and written one task at a time.
pub trait TaskStore {
    /// Returns every task currently held by the store.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Store`] if the store cannot be read.
    fn load(&self) -> Result<TaskCollection, TaskError>;

    /// Inserts or replaces `task`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Store`] if the write fails.
    fn save(&mut self, task: &Task) -> Result<(), TaskError>;
}

/// In-memory [`TaskStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    tasks: TaskCollection,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrows the stored tasks.
    #[must_use]
    pub const fn tasks(&self) -> &TaskCollection {
        &self.tasks
    }

    /// Consumes the store, returning its tasks.
    #[must_use]
    pub fn into_tasks(self) -> TaskCollection {
        self.tasks
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Number of stored tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the store holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl From<TaskCollection> for MemoryStore {
    fn from(tasks: TaskCollection) -> Self {
        Self { tasks }
    }
}

impl TaskStore for MemoryStore {
    fn load(&self) -> Result<TaskCollection, TaskError> {
        Ok(self.tasks.clone())
    }

    fn save(&mut self, task: &Task) -> Result<(), TaskError> {
        self.tasks.insert(task.id.clone(), task.clone());
        Ok(())
    }
}

/// What a [`synchronize`] run wrote to each side.
///
/// Id lists are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Tasks created in the local store.
    pub created_local: Vec<TaskId>,
    /// Tasks overwritten in the local store.
    pub updated_local: Vec<TaskId>,
    /// Tasks created in the remote store.
    pub created_remote: Vec<TaskId>,
    /// Tasks overwritten in the remote store.
    pub updated_remote: Vec<TaskId>,
    /// Canonical state after the merge.
    pub merged: TaskCollection,
}

impl SyncReport {
    /// Total number of task writes performed.
    #[must_use]
    pub fn total_writes(&self) -> usize {
        self.created_local.len()
            + self.updated_local.len()
            + self.created_remote.len()
            + self.updated_remote.len()
    }
}

/// Merges `local` and `remote` and applies the resulting writes to both.
///
/// # Errors
///
/// Propagates load/save failures from either store, and
/// [`TaskError::IdMismatch`] from the merge. Writes are not rolled back if
/// a later save fails.
pub fn synchronize<L, R>(local: &mut L, remote: &mut R) -> Result<SyncReport, TaskError>
where
    L: TaskStore + ?Sized,
    R: TaskStore + ?Sized,
{
    let local_tasks = local.load()?;
    let remote_tasks = remote.load()?;
    debug!(
        local = local_tasks.len(),
        remote = remote_tasks.len(),
        "loaded task stores"
    );

    let plan = merge_task_lists(&local_tasks, &remote_tasks)?;

    let report = SyncReport {
        created_local: apply(local, &plan.create_local)?,
        updated_local: apply(local, &plan.update_local)?,
        created_remote: apply(remote, &plan.create_remote)?,
        updated_remote: apply(remote, &plan.update_remote)?,
        merged: plan.merged,
    };

    info!(
        merged = report.merged.len(),
        created_local = report.created_local.len(),
        updated_local = report.updated_local.len(),
        created_remote = report.created_remote.len(),
        updated_remote = report.updated_remote.len(),
        "task sync complete"
    );
    Ok(report)
}

/// Saves every task of `tasks` into `store` in id order, returning the ids.
fn apply<S: TaskStore + ?Sized>(
    store: &mut S,
    tasks: &TaskCollection,
) -> Result<Vec<TaskId>, TaskError> {
    let mut ids: Vec<&TaskId> = tasks.keys().collect();
    ids.sort();
    let mut written = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(task) = tasks.get(id) {
            store.save(task)?;
            written.push(id.clone());
        }
    }
    Ok(written)
}
