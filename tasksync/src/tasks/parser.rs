//! Quick-add parsing of free-form task text.
//!
//! ```text
//! Buy milk @shopping !2 #tomorrow
//! Finish report for client XYZ !urgent #friday @work @project
//! ```
//!
//! Markers must follow whitespace, so the first word is always title text:
//! - `!1`..`!4` or `!low|medium|high|urgent` sets the priority (first wins)
//! - `@tag` adds a tag
//! - `#when` sets the due date: `today`, `now`, `tomorrow`, `next_week`,
//!   a weekday name, or `YYYY-MM-DD` (first recognised marker wins)
//!
//! Every marker is stripped from the title.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use regex::Regex;
use tasksync_proto::{MAX_TASK_TITLE_LENGTH, Priority, Task};
use tracing::debug;

use super::TaskError;

/// Builds a new task from quick-add text, using `now` for timestamps and
/// relative dates.
///
/// # Errors
///
/// Returns [`TaskError::TitleEmpty`] if nothing is left once markers are
/// removed, [`TaskError::TitleTooLong`] if the title exceeds
/// [`MAX_TASK_TITLE_LENGTH`] characters, or [`TaskError::Pattern`] if a
/// marker pattern fails to compile.
pub fn parse_task_from_text(text: &str, now: DateTime<Utc>) -> Result<Task, TaskError> {
    let priority_re = Regex::new(r"(?i)\s!([1-4]|urgent|high|medium|low)\b")?;
    let tag_re = Regex::new(r"\s@(\w+)")?;
    let date_re = Regex::new(r"\s#([\w-]+)")?;

    let mut title = text.trim().to_string();

    let priority = priority_re
        .captures(&title)
        .and_then(|caps| caps.get(1))
        .map_or(Priority::Medium, |m| priority_from_marker(m.as_str()));
    title = priority_re.replace_all(&title, "").into_owned();

    let tags: Vec<String> = tag_re
        .captures_iter(&title)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();
    title = tag_re.replace_all(&title, "").into_owned();

    let today = now.date_naive();
    let due_date = date_re
        .captures_iter(&title)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| resolve_date_marker(m.as_str(), today))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc());
    title = date_re.replace_all(&title, "").into_owned();

    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        return Err(TaskError::TitleEmpty);
    }
    if title.chars().count() > MAX_TASK_TITLE_LENGTH {
        return Err(TaskError::TitleTooLong);
    }

    let mut task = Task::new(title, now).with_priority(priority).with_tags(tags);
    task.due_date = due_date;

    debug!(
        task_id = %task.id,
        priority = %task.priority,
        tags = task.tags.len(),
        has_due_date = task.due_date.is_some(),
        "parsed quick-add task"
    );
    Ok(task)
}

fn priority_from_marker(marker: &str) -> Priority {
    match marker.to_ascii_lowercase().as_str() {
        "1" | "low" => Priority::Low,
        "3" | "high" => Priority::High,
        "4" | "urgent" => Priority::Urgent,
        _ => Priority::Medium,
    }
}

/// Maps a `#marker` to a calendar day, or `None` if it is not a date.
fn resolve_date_marker(marker: &str, today: NaiveDate) -> Option<NaiveDate> {
    let marker = marker.to_ascii_lowercase();
    match marker.as_str() {
        "today" | "now" => Some(today),
        "tomorrow" => today.succ_opt(),
        "next_week" | "nextweek" => today.checked_add_days(Days::new(7)),
        other => other.parse::<Weekday>().map_or_else(
            |_| NaiveDate::parse_from_str(other, "%Y-%m-%d").ok(),
            |weekday| next_weekday(today, weekday),
        ),
    }
}

/// Next occurrence of `weekday` strictly after `today`.
fn next_weekday(today: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let current = today.weekday().num_days_from_monday();
    let target = weekday.num_days_from_monday();
    let ahead = (7 + target - current - 1) % 7 + 1;
    today.checked_add_days(Days::new(u64::from(ahead)))
}
