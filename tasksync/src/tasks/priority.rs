//! Importance scoring and ranking.
//!
//! The score is additive: priority weight × 10, a due-date bonus, a status
//! penalty, a one-off bonus for attention tags, and a small bonus for tasks
//! touched within the last day. It is a pure function of the task and the
//! supplied reference time.

use std::cmp::Reverse;

use chrono::{DateTime, TimeDelta, Utc};
use tasksync_proto::{Task, TaskStatus};

/// Number of tasks returned by [`top_priority`] when no limit is given.
pub const DEFAULT_TOP_LIMIT: usize = 5;

/// Tags that earn the attention bonus (exact, case-sensitive).
const ATTENTION_TAGS: [&str; 3] = ["blocker", "critical", "urgent"];

const ATTENTION_TAG_BONUS: i32 = 8;
const RECENT_UPDATE_BONUS: i32 = 5;

/// Computes the importance score of `task` relative to `now`.
#[must_use]
pub fn calculate_task_score(task: &Task, now: DateTime<Utc>) -> i32 {
    let mut score = task.priority.weight() * 10;

    if let Some(due) = task.due_date {
        score += match floor_days(due - now) {
            days if days < 0 => 30,
            0 => 20,
            1..=2 => 15,
            3..=7 => 10,
            _ => 0,
        };
    }

    score -= match task.status {
        TaskStatus::Done => 50,
        TaskStatus::Review => 15,
        TaskStatus::Todo | TaskStatus::InProgress | TaskStatus::Blocked => 0,
    };

    if task
        .tags
        .iter()
        .any(|tag| ATTENTION_TAGS.contains(&tag.as_str()))
    {
        score += ATTENTION_TAG_BONUS;
    }

    if now - task.updated_at < TimeDelta::days(1) {
        score += RECENT_UPDATE_BONUS;
    }

    score
}

/// Scores every task and orders the pairs by descending score.
///
/// Equal scores keep their input order.
pub fn score_tasks<'a, I>(tasks: I, now: DateTime<Utc>) -> Vec<(i32, &'a Task)>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut scored: Vec<(i32, &Task)> = tasks
        .into_iter()
        .map(|task| (calculate_task_score(task, now), task))
        .collect();
    scored.sort_by_key(|(score, _)| Reverse(*score));
    scored
}

/// Orders tasks from most to least important. The sort is stable.
pub fn sort_by_importance<'a, I>(tasks: I, now: DateTime<Utc>) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    score_tasks(tasks, now)
        .into_iter()
        .map(|(_, task)| task)
        .collect()
}

/// Returns the `limit` most important tasks ([`DEFAULT_TOP_LIMIT`] if `None`).
pub fn top_priority<'a, I>(tasks: I, now: DateTime<Utc>, limit: Option<usize>) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut sorted = sort_by_importance(tasks, now);
    sorted.truncate(limit.unwrap_or(DEFAULT_TOP_LIMIT));
    sorted
}

/// Whole days in `delta`, rounded towards negative infinity.
fn floor_days(delta: TimeDelta) -> i64 {
    let days = delta.num_days();
    if delta < TimeDelta::days(days) {
        days - 1
    } else {
        days
    }
}
