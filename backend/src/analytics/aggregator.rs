//! Read-only analytics over one user's task list.
//!
//! [`aggregate`] is a pure function of the task slice and a reference
//! instant. Each output is derived independently from the same input, and a
//! task whose due date does not parse simply drops out of the date-based
//! buckets while still being counted everywhere else.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{task::Task, task_category::TaskCategory, task_status::TaskStatus};

use super::insights::generate_insights;

/// Days of history covered by `tasks_by_date`.
pub const HISTORY_WINDOW_DAYS: i64 = 30;
/// Days ahead covered by `upcoming_deadlines`.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    pub overdue_tasks: usize,
    pub due_today: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBucket {
    pub date: NaiveDate,
    pub added: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: TaskStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: TaskCategory,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub summary: Summary,
    pub tasks_by_date: Vec<DateBucket>,
    pub status_breakdown: Vec<StatusCount>,
    pub category_breakdown: Vec<CategoryCount>,
    pub upcoming_deadlines: Vec<Task>,
    pub ai_insights: Vec<String>,
}

pub fn aggregate(tasks: &[Task], now: DateTime<Utc>) -> AnalyticsSnapshot {
    // Parse every due date exactly once; failures become None for that task only.
    let dated: Vec<(&Task, Option<DateTime<Utc>>)> =
        tasks.iter().map(|task| (task, task.valid_due_at())).collect();

    let summary = summarize(&dated, now);
    let ai_insights = generate_insights(&summary, tasks);

    AnalyticsSnapshot {
        tasks_by_date: tasks_by_date(&dated, now),
        status_breakdown: status_breakdown(tasks),
        category_breakdown: category_breakdown(tasks),
        upcoming_deadlines: upcoming_deadlines(&dated, now),
        summary,
        ai_insights,
    }
}

fn summarize(dated: &[(&Task, Option<DateTime<Utc>>)], now: DateTime<Utc>) -> Summary {
    let today = now.date_naive();
    let mut summary = Summary {
        total_tasks: dated.len(),
        ..Summary::default()
    };

    for (task, due) in dated {
        match task.status {
            TaskStatus::Completed => summary.completed_tasks += 1,
            TaskStatus::Pending => summary.pending_tasks += 1,
            TaskStatus::InProgress => {}
        }

        let Some(due) = due else { continue };
        if task.status.is_completed() {
            continue;
        }
        if *due < now {
            summary.overdue_tasks += 1;
        }
        if due.date_naive() == today {
            summary.due_today += 1;
        }
    }

    summary
}

fn tasks_by_date(dated: &[(&Task, Option<DateTime<Utc>>)], now: DateTime<Utc>) -> Vec<DateBucket> {
    let window_start = now - Duration::days(HISTORY_WINDOW_DAYS);
    let mut buckets: BTreeMap<NaiveDate, DateBucket> = BTreeMap::new();

    for (task, due) in dated {
        let Some(due) = due.filter(|due| *due >= window_start && *due <= now) else {
            continue;
        };
        let date = due.date_naive();
        let bucket = buckets.entry(date).or_insert(DateBucket {
            date,
            added: 0,
            completed: 0,
        });
        bucket.added += 1;
        if task.status.is_completed() {
            bucket.completed += 1;
        }
    }

    buckets.into_values().collect()
}

fn status_breakdown(tasks: &[Task]) -> Vec<StatusCount> {
    count_first_seen(tasks.iter().map(|task| task.status))
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect()
}

pub(crate) fn category_breakdown(tasks: &[Task]) -> Vec<CategoryCount> {
    count_first_seen(tasks.iter().map(|task| task.category))
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect()
}

fn upcoming_deadlines(dated: &[(&Task, Option<DateTime<Utc>>)], now: DateTime<Utc>) -> Vec<Task> {
    let horizon = now + Duration::days(UPCOMING_WINDOW_DAYS);

    let mut upcoming: Vec<(DateTime<Utc>, &Task)> = dated
        .iter()
        .filter(|(task, _)| !task.status.is_completed())
        .filter_map(|(task, due)| due.map(|due| (due, *task)))
        .filter(|(due, _)| *due >= now && *due <= horizon)
        .collect();

    // Stable: tasks sharing a due date keep their input order.
    upcoming.sort_by_key(|(due, _)| *due);
    upcoming.into_iter().map(|(_, task)| task.clone()).collect()
}

/// Counts per distinct key, ordered by first appearance.
fn count_first_seen<K: PartialEq>(keys: impl Iterator<Item = K>) -> Vec<(K, usize)> {
    let mut counts: Vec<(K, usize)> = Vec::new();
    for key in keys {
        match counts.iter_mut().find(|(seen, _)| *seen == key) {
            Some((_, count)) => *count += 1,
            None => counts.push((key, 1)),
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_task_request::CreateTaskRequest, task_priority::TaskPriority};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn task(
        title: &str,
        status: TaskStatus,
        category: TaskCategory,
        due: Option<DateTime<Utc>>,
    ) -> Task {
        let created = now() - Duration::days(40);
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            due_date: due.map(|d| d.to_rfc3339()),
            category,
            status,
            priority: TaskPriority::Medium,
            completed_at: None,
            user: Uuid::nil(),
            created_at: created,
            updated_at: created,
        }
    }

    fn example_tasks() -> Vec<Task> {
        vec![
            task("a", TaskStatus::Completed, TaskCategory::Work, Some(now() - Duration::days(3))),
            task("b", TaskStatus::Completed, TaskCategory::Personal, None),
            task("c", TaskStatus::Completed, TaskCategory::Work, Some(now() + Duration::days(10))),
            task("late", TaskStatus::Pending, TaskCategory::Work, Some(now() - Duration::days(2))),
            task("today", TaskStatus::Pending, TaskCategory::Personal, Some(now() + Duration::hours(3))),
        ]
    }

    #[test]
    fn worked_example_summary_and_insights() {
        let snapshot = aggregate(&example_tasks(), now());

        assert_eq!(
            snapshot.summary,
            Summary {
                total_tasks: 5,
                completed_tasks: 3,
                pending_tasks: 2,
                overdue_tasks: 1,
                due_today: 1,
            }
        );

        let insights = &snapshot.ai_insights;
        assert_eq!(insights.len(), 3);
        assert!(insights[0].contains("1 overdue"));
        assert!(insights[1].contains("1 due today"));
        assert!(insights[2].contains("Work"));
        assert!(insights[2].contains('3'));
    }

    #[test]
    fn empty_input_yields_empty_snapshot() {
        let snapshot = aggregate(&[], now());
        assert_eq!(snapshot, AnalyticsSnapshot::default());
    }

    #[test]
    fn unparsable_due_date_only_leaves_date_buckets() {
        let mut bad = task("bad", TaskStatus::Pending, TaskCategory::Urgent, None);
        bad.due_date = Some("not-a-date".to_string());

        let snapshot = aggregate(&[bad], now());

        assert_eq!(snapshot.summary.total_tasks, 1);
        assert_eq!(snapshot.summary.pending_tasks, 1);
        assert_eq!(snapshot.summary.overdue_tasks, 0);
        assert_eq!(snapshot.summary.due_today, 0);
        assert!(snapshot.tasks_by_date.is_empty());
        assert!(snapshot.upcoming_deadlines.is_empty());
        assert_eq!(
            snapshot.status_breakdown,
            vec![StatusCount { status: TaskStatus::Pending, count: 1 }]
        );
        assert_eq!(
            snapshot.category_breakdown,
            vec![CategoryCount { category: TaskCategory::Urgent, count: 1 }]
        );
    }

    #[test]
    fn total_is_sum_of_status_buckets() {
        let mut tasks = example_tasks();
        tasks.push(task("wip", TaskStatus::InProgress, TaskCategory::Other, None));

        let snapshot = aggregate(&tasks, now());
        let bucketed: usize = snapshot.status_breakdown.iter().map(|s| s.count).sum();

        assert_eq!(snapshot.summary.total_tasks, bucketed);
        assert_eq!(
            snapshot.summary.total_tasks,
            snapshot.summary.completed_tasks + snapshot.summary.pending_tasks + 1
        );
    }

    #[test]
    fn overdue_tasks_never_show_as_upcoming() {
        let snapshot = aggregate(&example_tasks(), now());
        assert!(snapshot
            .upcoming_deadlines
            .iter()
            .all(|t| t.valid_due_at().unwrap() >= now()));
        assert!(!snapshot.upcoming_deadlines.iter().any(|t| t.title == "late"));
    }

    #[test]
    fn upcoming_window_is_inclusive_and_sorted() {
        let tasks = vec![
            task("edge", TaskStatus::Pending, TaskCategory::Other, Some(now() + Duration::days(7))),
            task("soon", TaskStatus::InProgress, TaskCategory::Other, Some(now() + Duration::days(1))),
            task("now", TaskStatus::Pending, TaskCategory::Other, Some(now())),
            task("far", TaskStatus::Pending, TaskCategory::Other, Some(now() + Duration::days(8))),
            task("done", TaskStatus::Completed, TaskCategory::Other, Some(now() + Duration::days(2))),
        ];

        let titles: Vec<String> = aggregate(&tasks, now())
            .upcoming_deadlines
            .into_iter()
            .map(|t| t.title)
            .collect();

        assert_eq!(titles, vec!["now", "soon", "edge"]);
    }

    #[test]
    fn tasks_by_date_groups_by_day_within_window() {
        let day = |offset: i64| now() - Duration::days(offset);
        let tasks = vec![
            task("x", TaskStatus::Completed, TaskCategory::Work, Some(day(1))),
            task("y", TaskStatus::Pending, TaskCategory::Work, Some(day(1) + Duration::hours(2))),
            task("z", TaskStatus::Pending, TaskCategory::Work, Some(day(5))),
            task("boundary", TaskStatus::Completed, TaskCategory::Work, Some(day(30))),
            task("old", TaskStatus::Pending, TaskCategory::Work, Some(day(31))),
            task("future", TaskStatus::Pending, TaskCategory::Work, Some(now() + Duration::days(1))),
        ];

        let buckets = aggregate(&tasks, now()).tasks_by_date;

        assert_eq!(
            buckets,
            vec![
                DateBucket { date: day(30).date_naive(), added: 1, completed: 1 },
                DateBucket { date: day(5).date_naive(), added: 1, completed: 0 },
                DateBucket { date: day(1).date_naive(), added: 2, completed: 1 },
            ]
        );
        assert!(buckets.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn breakdowns_follow_first_seen_order() {
        let tasks = vec![
            task("1", TaskStatus::InProgress, TaskCategory::Urgent, None),
            task("2", TaskStatus::Pending, TaskCategory::Work, None),
            task("3", TaskStatus::InProgress, TaskCategory::Urgent, None),
        ];
        let snapshot = aggregate(&tasks, now());

        assert_eq!(
            snapshot.status_breakdown,
            vec![
                StatusCount { status: TaskStatus::InProgress, count: 2 },
                StatusCount { status: TaskStatus::Pending, count: 1 },
            ]
        );
        assert_eq!(
            snapshot.category_breakdown,
            vec![
                CategoryCount { category: TaskCategory::Urgent, count: 2 },
                CategoryCount { category: TaskCategory::Work, count: 1 },
            ]
        );
    }

    #[test]
    fn aggregation_is_idempotent() {
        let tasks = example_tasks();
        assert_eq!(aggregate(&tasks, now()), aggregate(&tasks, now()));
    }

    #[test]
    fn snapshot_serializes_with_camel_case_keys() {
        let request = CreateTaskRequest {
            title: "Ship".to_string(),
            due_date: Some("2024-06-16".to_string()),
            ..CreateTaskRequest::default()
        };
        let t = Task::new(Uuid::new_v4(), request, now()).unwrap();
        let json = serde_json::to_value(aggregate(&[t], now())).unwrap();

        assert_eq!(json["summary"]["totalTasks"], 1);
        assert_eq!(json["summary"]["dueToday"], 0);
        assert_eq!(json["upcomingDeadlines"].as_array().unwrap().len(), 1);
        assert!(json["tasksByDate"].as_array().unwrap().is_empty());
        assert_eq!(json["statusBreakdown"][0]["status"], "Pending");
        assert!(json.get("aiInsights").is_some());
    }
}
