use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::{
    api_error::ApiError, app_state::SharedState, create_task_request::CreateTaskRequest,
    message_response::MessageResponse, task::Task, task_query::TaskQuery,
    update_task_request::UpdateTaskRequest, user::User,
};

pub struct TaskController {}

impl TaskController {
    pub async fn get_all(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        Query(query): Query<TaskQuery>,
    ) -> Result<Json<Vec<Task>>, ApiError> {
        let due_on = query
            .due_date
            .as_deref()
            .map(|raw| {
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|_| ApiError::Validation(format!("invalid dueDate filter \"{raw}\"")))
            })
            .transpose()?;

        let mut tasks: Vec<Task> = state
            .data_context
            .list_tasks(user.id)?
            .into_iter()
            .filter(|task| query.category.map_or(true, |category| task.category == category))
            .filter(|task| query.status.map_or(true, |status| task.status == status))
            .filter(|task| due_on.map_or(true, |day| task.is_due_on(day)))
            .collect();

        // Newest first.
        tasks.reverse();
        Ok(Json(tasks))
    }

    pub async fn get(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        Path(id): Path<Uuid>,
    ) -> Result<Json<Task>, ApiError> {
        state
            .data_context
            .get_task(user.id, id)?
            .map(Json)
            .ok_or_else(task_not_found)
    }

    pub async fn add(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        Json(body): Json<CreateTaskRequest>,
    ) -> Result<(StatusCode, Json<Task>), ApiError> {
        let task = Task::new(user.id, body, Utc::now())?;
        state.data_context.create_task(&task)?;

        info!(task_id = %task.id, user_id = %user.id, "task created");
        Ok((StatusCode::CREATED, Json(task)))
    }

    pub async fn edit(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        Path(id): Path<Uuid>,
        Json(body): Json<UpdateTaskRequest>,
    ) -> Result<Json<Task>, ApiError> {
        let mut task = state
            .data_context
            .get_task(user.id, id)?
            .ok_or_else(task_not_found)?;

        task.apply(body, Utc::now())?;
        if !state.data_context.update_task(&task)? {
            return Err(task_not_found());
        }

        Ok(Json(task))
    }

    pub async fn delete(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        Path(id): Path<Uuid>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        if !state.data_context.delete_task(user.id, id)? {
            return Err(task_not_found());
        }

        info!(task_id = %id, user_id = %user.id, "task deleted");
        Ok(Json(MessageResponse {
            message: "Task removed".to_string(),
        }))
    }
}

fn task_not_found() -> ApiError {
    ApiError::NotFound("Task not found".to_string())
}
