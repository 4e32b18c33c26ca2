//! Property-based tests for task merge and importance scoring.
//!
//! Uses proptest to verify:
//! 1. Merged tags are the set union of both sides.
//! 2. A completed side always yields a completed merge.
//! 3. `updated_at` of the merge is the later of the two inputs.
//! 4. When only recency differs, exactly one side is flagged for update.
//! 5. List merge covers every id and never both creates and updates one.
//! 6. Scoring is deterministic and monotone in priority.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use proptest::prelude::*;
use tasksync::tasks::{calculate_task_score, merge_task_lists, resolve_task_conflict};
use tasksync_proto::{Priority, Task, TaskCollection, TaskStatus};

// --- Strategies ---

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop::sample::select(Priority::ALL.to_vec())
}

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Todo),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::Review),
        Just(TaskStatus::Done),
        Just(TaskStatus::Blocked),
    ]
}

/// Tags drawn from a small vocabulary so that both sides overlap often.
fn arb_tags() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(
        prop::sample::select(vec!["a", "b", "c", "blocker", "urgent"]),
        0..4,
    )
    .prop_map(|set| set.into_iter().map(str::to_string).collect())
}

/// Strategy for a task with the given id.
fn arb_task_with_id(id: String) -> impl Strategy<Value = Task> {
    (
        "[A-Za-z ]{1,24}",
        arb_priority(),
        arb_status(),
        0i64..10_000,
        prop::option::of(-20_000i64..20_000),
        arb_tags(),
    )
        .prop_map(
            move |(title, priority, status, updated_offset, due_offset, tags)| {
                let mut task = Task::new(title, base_time())
                    .with_id(id.as_str())
                    .with_priority(priority)
                    .with_tags(tags);
                task.due_date = due_offset.map(|m| base_time() + TimeDelta::minutes(m));
                task.status = status;
                task.updated_at = base_time() + TimeDelta::minutes(updated_offset);
                if status.is_done() {
                    task.completed_at = Some(task.updated_at);
                }
                task
            },
        )
}

fn arb_task() -> impl Strategy<Value = Task> {
    "[a-h]".prop_flat_map(arb_task_with_id)
}

/// Two versions of the same task.
fn arb_task_pair() -> impl Strategy<Value = (Task, Task)> {
    "[a-h]".prop_flat_map(|id| (arb_task_with_id(id.clone()), arb_task_with_id(id)))
}

fn arb_collection() -> impl Strategy<Value = TaskCollection> {
    prop::collection::vec(arb_task(), 0..8)
        .prop_map(|tasks| tasks.into_iter().map(|t| (t.id.clone(), t)).collect())
}

fn tag_set(tags: &[String]) -> HashSet<&str> {
    tags.iter().map(String::as_str).collect()
}

// --- Merge properties ---

proptest! {
    #[test]
    fn merged_tags_are_union((local, remote) in arb_task_pair()) {
        let res = resolve_task_conflict(&local, &remote).unwrap();
        let expected: HashSet<&str> = tag_set(&local.tags)
            .union(&tag_set(&remote.tags))
            .copied()
            .collect();
        prop_assert_eq!(tag_set(&res.merged.tags), expected);
        prop_assert_eq!(res.merged.tags.len(), tag_set(&res.merged.tags).len());
    }

    #[test]
    fn completion_is_sticky((local, remote) in arb_task_pair()) {
        let res = resolve_task_conflict(&local, &remote).unwrap();
        if local.status.is_done() || remote.status.is_done() {
            prop_assert_eq!(res.merged.status, TaskStatus::Done);
            prop_assert!(res.merged.completed_at.is_some());
        }
    }

    #[test]
    fn merged_updated_at_is_latest((local, remote) in arb_task_pair()) {
        let res = resolve_task_conflict(&local, &remote).unwrap();
        prop_assert_eq!(res.merged.updated_at, local.updated_at.max(remote.updated_at));
        prop_assert!(res.update_local || res.update_remote);
    }

    #[test]
    fn recency_only_flags_exactly_one_side(local in arb_task(), shift in 1i64..1_000, remote_newer: bool) {
        let mut remote = local.clone();
        let delta = TimeDelta::minutes(shift);
        remote.updated_at = if remote_newer {
            local.updated_at + delta
        } else {
            local.updated_at - delta
        };

        let res = resolve_task_conflict(&local, &remote).unwrap();
        prop_assert_eq!(res.update_local, remote_newer);
        prop_assert_eq!(res.update_remote, !remote_newer);
    }

    #[test]
    fn merge_with_empty_side_copies_everything(tasks in arb_collection()) {
        let empty = TaskCollection::new();

        let result = merge_task_lists(&tasks, &empty).unwrap();
        prop_assert_eq!(&result.merged, &tasks);
        prop_assert_eq!(&result.create_remote, &tasks);
        prop_assert_eq!(result.pending_writes(), tasks.len());

        let result = merge_task_lists(&empty, &tasks).unwrap();
        prop_assert_eq!(&result.merged, &tasks);
        prop_assert_eq!(&result.create_local, &tasks);
        prop_assert_eq!(result.pending_writes(), tasks.len());
    }

    #[test]
    fn merge_classification_is_consistent(local in arb_collection(), remote in arb_collection()) {
        let result = merge_task_lists(&local, &remote).unwrap();

        let mut all_ids: HashSet<_> = local.keys().collect();
        all_ids.extend(remote.keys());
        let merged_ids: HashSet<_> = result.merged.keys().collect();
        prop_assert_eq!(merged_ids, all_ids);

        for id in result.create_remote.keys() {
            prop_assert!(!result.update_remote.contains_key(id));
            prop_assert!(!remote.contains_key(id));
        }
        for id in result.create_local.keys() {
            prop_assert!(!result.update_local.contains_key(id));
            prop_assert!(!local.contains_key(id));
        }
        for (id, task) in result.update_local.iter().chain(&result.update_remote) {
            prop_assert!(local.contains_key(id) && remote.contains_key(id));
            prop_assert_eq!(task, &result.merged[id]);
        }
    }
}

// --- Scoring properties ---

proptest! {
    #[test]
    fn score_is_deterministic(task in arb_task(), offset in 0i64..20_000) {
        let now = base_time() + TimeDelta::minutes(offset);
        prop_assert_eq!(calculate_task_score(&task, now), calculate_task_score(&task, now));
    }

    #[test]
    fn higher_priority_scores_higher(task in arb_task(), offset in 0i64..20_000) {
        let now = base_time() + TimeDelta::minutes(offset);
        let scores: Vec<i32> = Priority::ALL
            .iter()
            .map(|p| calculate_task_score(&task.clone().with_priority(*p), now))
            .collect();
        prop_assert!(scores.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn done_costs_exactly_fifty(task in arb_task(), offset in 0i64..20_000) {
        let now = base_time() + TimeDelta::minutes(offset);
        let mut todo = task.clone();
        todo.status = TaskStatus::Todo;
        let mut done = task;
        done.status = TaskStatus::Done;
        prop_assert_eq!(
            calculate_task_score(&done, now),
            calculate_task_score(&todo, now) - 50
        );
    }
}
