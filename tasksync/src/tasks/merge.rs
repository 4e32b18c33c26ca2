//! Conflict resolution and list merging for local/remote task collections.
//!
//! [`resolve_task_conflict`] reconciles two copies of one task in a fixed
//! sequence of field passes; [`merge_task_lists`] classifies every id of
//! the two collections and gathers the write-back actions for each side.
//!
//! Resolution rules:
//! 1. The strictly newer side (`updated_at`) supplies title, description,
//!    priority and due date. Equal timestamps keep the local values.
//! 2. `Done` beats any other status regardless of recency. Otherwise a
//!    status difference is settled by recency, as in rule 1.
//! 3. Tags are the union of both sides.
//! 4. The merged `updated_at` is the later of the two.
//!
//! Each pass can only raise the `update_local` / `update_remote` flags.

use std::collections::{HashMap, HashSet};
use std::hash::BuildHasher;

use tasksync_proto::{Task, TaskCollection, TaskId, TaskStatus};
use tracing::debug;

use super::TaskError;

/// Outcome of reconciling one local/remote task pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictResolution {
    /// The reconciled task, owned independently of both inputs.
    pub merged: Task,
    /// The local copy differs from `merged` and must be overwritten.
    pub update_local: bool,
    /// The remote copy differs from `merged` and must be overwritten.
    pub update_remote: bool,
}

/// Result of merging two task collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeResult {
    /// Canonical state after the merge.
    pub merged: TaskCollection,
    /// Tasks that only exist locally and must be created remotely.
    pub create_remote: TaskCollection,
    /// Tasks whose remote copy must be overwritten.
    pub update_remote: TaskCollection,
    /// Tasks that only exist remotely and must be created locally.
    pub create_local: TaskCollection,
    /// Tasks whose local copy must be overwritten.
    pub update_local: TaskCollection,
}

impl MergeResult {
    /// Returns `true` when neither side needs any write.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.pending_writes() == 0
    }

    /// Total number of task writes across both sides.
    #[must_use]
    pub fn pending_writes(&self) -> usize {
        self.create_remote.len()
            + self.update_remote.len()
            + self.create_local.len()
            + self.update_local.len()
    }
}

/// Reconciles two versions of the same task.
///
/// The merged task starts as a clone of `local`; neither input is touched.
///
/// # Errors
///
/// Returns [`TaskError::IdMismatch`] if the two tasks have different ids.
pub fn resolve_task_conflict(local: &Task, remote: &Task) -> Result<ConflictResolution, TaskError> {
    if local.id != remote.id {
        return Err(TaskError::IdMismatch {
            local: local.id.to_string(),
            remote: remote.id.to_string(),
        });
    }

    let mut merged = local.clone();
    let mut update_local = false;
    let mut update_remote = false;

    let remote_newer = remote.updated_at > local.updated_at;
    if remote_newer {
        merged.title.clone_from(&remote.title);
        merged.description.clone_from(&remote.description);
        merged.priority = remote.priority;
        merged.due_date = remote.due_date;
        update_local = true;
    } else {
        update_remote = true;
    }

    match (local.status.is_done(), remote.status.is_done()) {
        (false, true) => {
            merged.status = TaskStatus::Done;
            merged.completed_at = remote.completed_at;
            update_local = true;
        }
        (true, false) => update_remote = true,
        (false, false) if local.status != remote.status => {
            if remote_newer {
                merged.status = remote.status;
                update_local = true;
            } else {
                update_remote = true;
            }
        }
        _ => {}
    }

    let tags = union_tags(&local.tags, &remote.tags);
    let merged_set = tag_set(&tags);
    if merged_set != tag_set(&local.tags) {
        update_local = true;
    }
    if merged_set != tag_set(&remote.tags) {
        update_remote = true;
    }
    merged.tags = tags;

    merged.updated_at = local.updated_at.max(remote.updated_at);

    debug!(
        task_id = %merged.id,
        remote_newer,
        update_local,
        update_remote,
        "resolved task conflict"
    );

    Ok(ConflictResolution {
        merged,
        update_local,
        update_remote,
    })
}

/// Merges a local and a remote task collection.
///
/// - Local-only ids are copied into `merged` and `create_remote`.
/// - Remote-only ids are copied into `merged` and `create_local`.
/// - Shared ids go through [`resolve_task_conflict`]; the merged task lands
///   in `update_local` and/or `update_remote` according to its flags.
///
/// The result does not depend on map iteration order.
///
/// # Errors
///
/// Returns [`TaskError::IdMismatch`] if a shared key maps to tasks whose
/// own ids differ.
pub fn merge_task_lists<S1: BuildHasher, S2: BuildHasher>(
    local: &HashMap<TaskId, Task, S1>,
    remote: &HashMap<TaskId, Task, S2>,
) -> Result<MergeResult, TaskError> {
    let mut result = MergeResult::default();

    for (id, local_task) in local {
        if let Some(remote_task) = remote.get(id) {
            let resolution = resolve_task_conflict(local_task, remote_task)?;
            if resolution.update_local {
                result
                    .update_local
                    .insert(id.clone(), resolution.merged.clone());
            }
            if resolution.update_remote {
                result
                    .update_remote
                    .insert(id.clone(), resolution.merged.clone());
            }
            result.merged.insert(id.clone(), resolution.merged);
        } else {
            result.create_remote.insert(id.clone(), local_task.clone());
            result.merged.insert(id.clone(), local_task.clone());
        }
    }

    for (id, remote_task) in remote {
        if !local.contains_key(id) {
            result.create_local.insert(id.clone(), remote_task.clone());
            result.merged.insert(id.clone(), remote_task.clone());
        }
    }

    debug!(
        merged = result.merged.len(),
        create_remote = result.create_remote.len(),
        update_remote = result.update_remote.len(),
        create_local = result.create_local.len(),
        update_local = result.update_local.len(),
        "merged task lists"
    );

    Ok(result)
}

/// Local tags in order, followed by remote tags not seen yet.
fn union_tags(local: &[String], remote: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    local
        .iter()
        .chain(remote)
        .filter(|tag| seen.insert(tag.as_str()))
        .cloned()
        .collect()
}

fn tag_set(tags: &[String]) -> HashSet<&str> {
    tags.iter().map(String::as_str).collect()
}
