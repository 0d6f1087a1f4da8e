use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    create_task_request::CreateTaskRequest,
    due_date::{normalize_due_date, parse_due_date, InvalidDueDate},
    task_category::TaskCategory,
    task_priority::TaskPriority,
    task_status::TaskStatus,
    update_task_request::UpdateTaskRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskValidationError {
    #[error("Task title is required")]
    EmptyTitle,
    #[error(transparent)]
    InvalidDueDate(#[from] InvalidDueDate),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Raw stored value. Use [`Task::due_at`] to read it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub category: TaskCategory,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub user: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        user: Uuid,
        request: CreateTaskRequest,
        now: DateTime<Utc>,
    ) -> Result<Self, TaskValidationError> {
        let title = validated_title(&request.title)?;
        let due_date = validated_due_date(request.due_date.as_deref())?;

        let mut task = Self {
            id: Uuid::new_v4(),
            title,
            description: trimmed(request.description),
            due_date,
            category: request.category.unwrap_or_default(),
            status: TaskStatus::Pending,
            priority: request.priority.unwrap_or_default(),
            completed_at: None,
            user,
            created_at: now,
            updated_at: now,
        };
        task.set_status(request.status.unwrap_or_default(), now);
        Ok(task)
    }

    /// Apply a partial update. Nothing is modified when validation fails.
    pub fn apply(
        &mut self,
        request: UpdateTaskRequest,
        now: DateTime<Utc>,
    ) -> Result<(), TaskValidationError> {
        let title = request.title.as_deref().map(validated_title).transpose()?;
        let due_date = request
            .due_date
            .as_deref()
            .map(|raw| validated_due_date(Some(raw)))
            .transpose()?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = request.description {
            self.description = trimmed(Some(description));
        }
        if let Some(due_date) = due_date {
            self.due_date = due_date;
        }
        if let Some(category) = request.category {
            self.category = category;
        }
        if let Some(priority) = request.priority {
            self.priority = priority;
        }
        if let Some(status) = request.status {
            self.set_status(status, now);
        }

        self.updated_at = now;
        Ok(())
    }

    /// `completed_at` is stamped the first time the task becomes Completed
    /// and is never cleared afterwards.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        if status.is_completed() && self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
        self.status = status;
    }

    /// `None` when no due date is set, `Some(Err(_))` when the stored value
    /// does not parse.
    pub fn due_at(&self) -> Option<Result<DateTime<Utc>, InvalidDueDate>> {
        self.due_date.as_deref().map(parse_due_date)
    }

    pub fn valid_due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at().and_then(Result::ok)
    }

    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.valid_due_at()
            .is_some_and(|due| due.date_naive() == day)
    }
}

fn validated_title(raw: &str) -> Result<String, TaskValidationError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(title.to_string())
}

// An empty string clears the due date.
fn validated_due_date(raw: Option<&str>) -> Result<Option<String>, TaskValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Ok(Some(normalize_due_date(value)?)),
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
