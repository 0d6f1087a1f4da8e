use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Duration, Utc};
use tracing::info;
use uuid::Uuid;

use crate::{
    ai_gateway::prompts::InsightCounts,
    analytics::{
        aggregator::{category_breakdown, CategoryCount, UPCOMING_WINDOW_DAYS},
        insights::top_category,
    },
    api_error::ApiError,
    app_state::SharedState,
    daily_plan_response::DailyPlanResponse,
    priority_suggestion_response::PrioritySuggestionResponse,
    quote_response::QuoteResponse,
    task::Task,
    task_insights_response::TaskInsightsResponse,
    user::User,
    weekly_focus_response::WeeklyFocusResponse,
};

pub const EMPTY_PLAN_MESSAGE: &str =
    "No tasks available for planning. Add some tasks to get a personalized daily plan.";
pub const EMPTY_INSIGHTS_MESSAGE: &str =
    "No task data available for insights. Start adding tasks to get personalized insights.";
pub const EMPTY_FOCUS_MESSAGE: &str =
    "No tasks were created in the last week. Add a few tasks to get a weekly focus suggestion.";

const LOOKBACK_DAYS: i64 = 7;

pub struct AiController {}

impl AiController {
    pub async fn priority(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        Path(task_id): Path<Uuid>,
    ) -> Result<Json<PrioritySuggestionResponse>, ApiError> {
        let task = state
            .data_context
            .get_task(user.id, task_id)?
            .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

        if task.valid_due_at().is_none() {
            return Err(ApiError::Validation(
                "Task must have a due date for priority suggestion".to_string(),
            ));
        }

        let suggestion = state.ai_gateway.suggest_priority(&task, Utc::now()).await?;
        Ok(Json(PrioritySuggestionResponse {
            success: true,
            suggestion,
        }))
    }

    pub async fn daily_plan(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
    ) -> Result<Json<DailyPlanResponse>, ApiError> {
        let mut tasks = state.data_context.list_tasks(user.id)?;
        if tasks.is_empty() {
            return Ok(Json(DailyPlanResponse {
                success: true,
                plan: EMPTY_PLAN_MESSAGE.to_string(),
            }));
        }

        sort_by_due_date(&mut tasks);
        info!(user_id = %user.id, tasks = tasks.len(), "generating daily plan");
        let plan = state.ai_gateway.generate_daily_plan(&tasks, Utc::now()).await?;
        Ok(Json(DailyPlanResponse { success: true, plan }))
    }

    pub async fn insights(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
    ) -> Result<Json<TaskInsightsResponse>, ApiError> {
        let tasks = state.data_context.list_tasks(user.id)?;
        let stats = insight_counts(&tasks, Utc::now());

        if stats.is_empty() {
            return Ok(Json(TaskInsightsResponse {
                success: true,
                stats,
                insights: EMPTY_INSIGHTS_MESSAGE.to_string(),
            }));
        }

        let insights = state.ai_gateway.summarize_insights(&stats).await?;
        Ok(Json(TaskInsightsResponse {
            success: true,
            stats,
            insights,
        }))
    }

    pub async fn quote(State(state): State<SharedState>) -> Result<Json<QuoteResponse>, ApiError> {
        let quote = state.ai_gateway.motivational_quote().await?;
        Ok(Json(QuoteResponse { success: true, quote }))
    }

    pub async fn weekly_focus(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
    ) -> Result<Json<WeeklyFocusResponse>, ApiError> {
        let since = Utc::now() - Duration::days(LOOKBACK_DAYS);
        let recent: Vec<Task> = state
            .data_context
            .list_tasks(user.id)?
            .into_iter()
            .filter(|task| task.created_at >= since)
            .collect();

        let counts = category_breakdown(&recent);
        let Some(&CategoryCount { category, count }) = top_category(&counts) else {
            return Ok(Json(WeeklyFocusResponse {
                success: true,
                suggestion: EMPTY_FOCUS_MESSAGE.to_string(),
                category: None,
                count: 0,
            }));
        };

        let suggestion = state.ai_gateway.weekly_focus_suggestion(&counts).await?;
        Ok(Json(WeeklyFocusResponse {
            success: true,
            suggestion,
            category: Some(category),
            count,
        }))
    }
}

/// Earliest due date first; tasks without a usable due date go last.
fn sort_by_due_date(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| match task.valid_due_at() {
        Some(due) => (false, Some(due)),
        None => (true, None),
    });
}

fn insight_counts(tasks: &[Task], now: DateTime<Utc>) -> InsightCounts {
    let week_ago = now - Duration::days(LOOKBACK_DAYS);
    let horizon = now + Duration::days(UPCOMING_WINDOW_DAYS);
    let mut counts = InsightCounts::default();

    for task in tasks {
        if task.status.is_completed() {
            if task.updated_at >= week_ago {
                counts.completed_weekly += 1;
            }
            continue;
        }
        let Some(due) = task.valid_due_at() else { continue };
        if due < now {
            counts.overdue += 1;
        } else if due <= horizon {
            counts.upcoming += 1;
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_task_request::CreateTaskRequest, task_status::TaskStatus};
    use axum::http::StatusCode;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    use crate::web_api::test_helpers::{get, post_json, read_json, TestHarness};

    fn task(title: &str, due: Option<&str>, status: TaskStatus, now: DateTime<Utc>) -> Task {
        let request = CreateTaskRequest {
            title: title.to_string(),
            due_date: due.map(str::to_string),
            status: Some(status),
            ..CreateTaskRequest::default()
        };
        Task::new(Uuid::new_v4(), request, now).unwrap()
    }

    #[test]
    fn counts_weekly_completions_overdue_and_upcoming() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let mut stale = task("old win", None, TaskStatus::Completed, now);
        stale.updated_at = now - Duration::days(8);
        let mut junk = task("junk", None, TaskStatus::Pending, now);
        junk.due_date = Some("not-a-date".to_string());

        let tasks = vec![
            task("win", None, TaskStatus::Completed, now),
            stale,
            task("late", Some("2024-06-09"), TaskStatus::Pending, now),
            task("soon", Some("2024-06-12"), TaskStatus::InProgress, now),
            task("far", Some("2024-07-01"), TaskStatus::Pending, now),
            task("done late", Some("2024-06-01"), TaskStatus::Completed, now),
            junk,
        ];

        assert_eq!(
            insight_counts(&tasks, now),
            InsightCounts {
                completed_weekly: 2,
                overdue: 1,
                upcoming: 1,
            }
        );
    }

    #[test]
    fn undated_tasks_sort_last() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let mut tasks = vec![
            task("none", None, TaskStatus::Pending, now),
            task("later", Some("2024-06-20"), TaskStatus::Pending, now),
            task("sooner", Some("2024-06-11"), TaskStatus::Pending, now),
        ];

        sort_by_due_date(&mut tasks);
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["sooner", "later", "none"]);
    }

    #[tokio::test]
    async fn empty_account_gets_fixed_messages_without_upstream() {
        // No API key is configured, so any upstream call would fail with 502.
        let harness = TestHarness::new();
        let token = harness.register("quiet@example.com").await;

        let plan: Value = read_json(harness.send(get("/api/ai/daily-plan", Some(token.as_str()))).await).await;
        assert_eq!(plan["plan"], EMPTY_PLAN_MESSAGE);

        let insights: Value = read_json(harness.send(get("/api/ai/insights", Some(token.as_str()))).await).await;
        assert_eq!(insights["insights"], EMPTY_INSIGHTS_MESSAGE);
        assert_eq!(insights["stats"], json!({ "completedWeekly": 0, "overdue": 0, "upcoming": 0 }));

        let focus: Value = read_json(harness.send(get("/api/ai/weekly-focus", Some(token.as_str()))).await).await;
        assert_eq!(focus["suggestion"], EMPTY_FOCUS_MESSAGE);
        assert_eq!(focus["category"], Value::Null);
        assert_eq!(focus["count"], 0);
    }

    #[tokio::test]
    async fn priority_requires_an_existing_dated_task() {
        let harness = TestHarness::new();
        let token = harness.register("prio@example.com").await;

        let missing = format!("/api/ai/priority/{}", Uuid::new_v4());
        let response = harness.send(get(&missing, Some(token.as_str()))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let created: Task = read_json(
            harness
                .send(post_json("/api/tasks", Some(token.as_str()), json!({ "title": "undated" })))
                .await,
        )
        .await;
        let response = harness
            .send(get(&format!("/api/ai/priority/{}", created.id), Some(token.as_str())))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_json(response).await;
        assert_eq!(body["message"], "Task must have a due date for priority suggestion");
    }

    #[tokio::test]
    async fn priority_rejects_an_unparseable_stored_due_date() {
        let harness = TestHarness::new();
        let token = harness.register("baddate@example.com").await;

        let created: Task = read_json(
            harness
                .send(post_json("/api/tasks", Some(token.as_str()), json!({ "title": "legacy" })))
                .await,
        )
        .await;
        let mut stored = created.clone();
        stored.due_date = Some("next tuesday".to_string());
        assert!(harness.state.data_context.update_task(&stored).unwrap());

        let response = harness
            .send(get(&format!("/api/ai/priority/{}", created.id), Some(token.as_str())))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_json(response).await;
        assert_eq!(body["message"], "Task must have a due date for priority suggestion");
    }

    #[tokio::test]
    async fn gateway_failure_is_bad_gateway() {
        let harness = TestHarness::new();
        let token = harness.register("quote@example.com").await;

        let response = harness.send(get("/api/ai/quote", Some(token.as_str()))).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: Value = read_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("API key"));
    }
}
