//! JSON snapshot encoding for task collections.
//!
//! A snapshot is a JSON array of [`Task`] values. Decoding is the boundary
//! where externally supplied data is validated: unknown priority or status
//! names, duplicate ids, and tasks whose `updated_at` precedes `created_at`
//! are rejected here so that merge and ranking can assume well-formed input.

use std::collections::HashMap;
use std::hash::BuildHasher;

use crate::task::{Task, TaskId};

/// Error type for snapshot encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// The same id appears more than once in a snapshot.
    #[error("duplicate task id in snapshot: {0}")]
    DuplicateId(String),
    /// A task was last updated before it was created.
    #[error("task {0} has updated_at earlier than created_at")]
    TimestampOrder(String),
}

/// Encodes a task collection as a pretty-printed JSON array, sorted by id.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if a task cannot be serialized.
pub fn encode_snapshot<S: BuildHasher>(
    tasks: &HashMap<TaskId, Task, S>,
) -> Result<Vec<u8>, CodecError> {
    let mut ordered: Vec<&Task> = tasks.values().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));
    serde_json::to_vec_pretty(&ordered).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a JSON array of tasks into a collection keyed by id.
///
/// # Errors
///
/// Returns `CodecError::Serialization` for malformed JSON or unknown enum
/// values, `CodecError::DuplicateId` if two tasks share an id, and
/// `CodecError::TimestampOrder` if a task violates `updated_at >= created_at`.
pub fn decode_snapshot(bytes: &[u8]) -> Result<HashMap<TaskId, Task>, CodecError> {
    let tasks: Vec<Task> =
        serde_json::from_slice(bytes).map_err(|e| CodecError::Serialization(e.to_string()))?;

    let mut collection = HashMap::with_capacity(tasks.len());
    for task in tasks {
        if task.updated_at < task.created_at {
            return Err(CodecError::TimestampOrder(task.id.to_string()));
        }
        if collection.contains_key(&task.id) {
            return Err(CodecError::DuplicateId(task.id.to_string()));
        }
        collection.insert(task.id.clone(), task);
    }
    Ok(collection)
}
