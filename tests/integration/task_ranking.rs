//! Integration tests for importance scoring and ranking.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use tasksync::tasks::{
    DEFAULT_TOP_LIMIT, calculate_task_score, parse_task_from_text, score_tasks,
    sort_by_importance, top_priority,
};
use tasksync_proto::{Priority, Task, TaskStatus};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 14, 8, 0, 0).unwrap()
}

/// Creates a task last updated two days before `now()`.
fn make_test_task(title: &str, priority: Priority) -> Task {
    let mut task = Task::new(title, now() - TimeDelta::days(10)).with_priority(priority);
    task.updated_at = now() - TimeDelta::days(2);
    task
}

fn titles(tasks: &[&Task]) -> Vec<String> {
    tasks.iter().map(|t| t.title.clone()).collect()
}

#[test]
fn score_is_deterministic_for_fixed_now() {
    let task = make_test_task("Task", Priority::High)
        .with_due_date(now() + TimeDelta::days(1))
        .with_tags(["critical"]);
    let first = calculate_task_score(&task, now());
    for _ in 0..10 {
        assert_eq!(calculate_task_score(&task, now()), first);
    }
    assert_eq!(first, 30 + 15 + 8);
}

#[test]
fn priority_strictly_increases_score() {
    let scores: Vec<i32> = Priority::ALL
        .iter()
        .map(|p| calculate_task_score(&make_test_task("Task", *p), now()))
        .collect();
    assert!(scores.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn sooner_due_dates_score_higher() {
    let score_due = |due: Option<DateTime<Utc>>| {
        let mut task = make_test_task("Task", Priority::Medium);
        task.due_date = due;
        calculate_task_score(&task, now())
    };
    let overdue = score_due(Some(now() - TimeDelta::days(1)));
    let today = score_due(Some(now()));
    let in_two_days = score_due(Some(now() + TimeDelta::days(2)));
    let in_a_week = score_due(Some(now() + TimeDelta::days(7)));
    let later = score_due(Some(now() + TimeDelta::days(10)));
    let undated = score_due(None);

    assert!(overdue > today);
    assert!(today > in_two_days);
    assert!(in_two_days > in_a_week);
    assert!(in_a_week > later);
    assert_eq!(later, undated);
}

#[test]
fn done_costs_fifty_and_review_fifteen() {
    let todo = make_test_task("Task", Priority::Urgent);
    let mut review = todo.clone();
    review.status = TaskStatus::Review;
    let mut done = todo.clone();
    done.status = TaskStatus::Done;

    let todo_score = calculate_task_score(&todo, now());
    assert_eq!(calculate_task_score(&review, now()), todo_score - 15);
    assert_eq!(calculate_task_score(&done, now()), todo_score - 50);
}

#[test]
fn recently_marked_done_task_keeps_recency_bonus() {
    let mut task = make_test_task("Task", Priority::Medium);
    task.mark_as_done(now() - TimeDelta::hours(2));
    assert_eq!(calculate_task_score(&task, now()), 20 - 50 + 5);
}

#[test]
fn five_tasks_sort_by_descending_score() {
    let tasks = vec![
        make_test_task("Urgent Priority", Priority::Urgent),
        make_test_task("High Priority", Priority::High),
        make_test_task("Low Priority Overdue Blocker", Priority::Low)
            .with_due_date(now() - TimeDelta::days(1))
            .with_tags(["blocker"]),
        {
            let mut done = make_test_task("Medium Priority Done", Priority::Medium);
            done.status = TaskStatus::Done;
            done
        },
        make_test_task("Medium Priority Due Soon", Priority::Medium)
            .with_due_date(now() + TimeDelta::days(2)),
    ];

    let scored = score_tasks(&tasks, now());
    let scores: Vec<i32> = scored.iter().map(|(s, _)| *s).collect();
    assert_eq!(scores, vec![48, 40, 35, 30, -30]);

    let sorted = sort_by_importance(&tasks, now());
    assert_eq!(
        titles(&sorted),
        vec![
            "Low Priority Overdue Blocker",
            "Urgent Priority",
            "Medium Priority Due Soon",
            "High Priority",
            "Medium Priority Done",
        ]
    );

    let top = top_priority(&tasks, now(), Some(3));
    assert_eq!(titles(&top), titles(&sorted[..3]));
}

#[test]
fn top_priority_defaults_and_bounds() {
    let tasks: Vec<Task> = (1..=7)
        .map(|i| make_test_task(&format!("Task {i}"), Priority::ALL[i % 4]))
        .collect();

    assert_eq!(top_priority(&tasks, now(), None).len(), DEFAULT_TOP_LIMIT);
    assert_eq!(top_priority(&tasks, now(), Some(3)).len(), 3);
    assert_eq!(top_priority(&tasks, now(), Some(100)).len(), tasks.len());
    assert!(top_priority(&tasks, now(), Some(0)).is_empty());
    assert!(top_priority(&Vec::<Task>::new(), now(), None).is_empty());

    // Task 3 and Task 7 are both urgent; input order breaks the tie.
    let top = top_priority(&tasks, now(), Some(2));
    assert_eq!(titles(&top), vec!["Task 3", "Task 7"]);
}

#[test]
fn parsed_quick_add_tasks_rank_sensibly() {
    let texts = [
        "Water plants !low",
        "Fix prod outage !urgent @blocker #today",
        "Write blog post #next_week",
        "Renew domain !high #tomorrow",
    ];
    let tasks: Vec<Task> = texts
        .iter()
        .map(|text| parse_task_from_text(text, now()).unwrap())
        .collect();

    let top = top_priority(&tasks, now(), Some(2));
    assert_eq!(titles(&top), vec!["Fix prod outage", "Renew domain"]);
}
