//! Prompt text for the generative-language endpoint.
//!
//! Everything here is pure string assembly so the wording can be tested
//! without a network.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    analytics::{aggregator::CategoryCount, insights::top_category},
    task::Task,
};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Counts fed to the insight summary prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightCounts {
    pub completed_weekly: usize,
    pub overdue: usize,
    pub upcoming: usize,
}

impl InsightCounts {
    pub fn is_empty(&self) -> bool {
        self.completed_weekly == 0 && self.overdue == 0 && self.upcoming == 0
    }
}

/// Whole days until `due`, rounded up. Negative when already past.
pub fn days_until(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ((due - now).num_milliseconds() as f64 / MILLIS_PER_DAY).ceil() as i64
}

pub fn priority_prompt(task: &Task, now: DateTime<Utc>) -> String {
    let due_line = match task.valid_due_at() {
        Some(due) => format!(
            "{} ({} days from now)",
            task.due_date.as_deref().unwrap_or_default(),
            days_until(due, now)
        ),
        None => "not set".to_string(),
    };

    format!(
        "Based on this task information, suggest an appropriate priority level (High, Medium, or Low):\n\
         - Title: {}\n\
         - Description: {}\n\
         - Due date: {}\n\
         - Category: {}\n\
         \n\
         Provide only the suggested priority level and a brief 1-sentence explanation.",
        task.title,
        task.description.as_deref().unwrap_or("None"),
        due_line,
        task.category,
    )
}

pub fn daily_plan_prompt(tasks: &[Task], now: DateTime<Utc>) -> String {
    let task_list = tasks
        .iter()
        .enumerate()
        .map(|(index, task)| {
            let due = match task.valid_due_at() {
                Some(due) => format!("Due in {} days", days_until(due, now)),
                None => "No due date".to_string(),
            };
            format!(
                "{}. {} - {} - Status: {} - Priority: {}",
                index + 1,
                task.title,
                due,
                task.status,
                task.priority
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Based on these tasks, create an optimal daily plan selecting 3-4 most important tasks.\n\
         Format the output as a schedule with specific time slots.\n\
         \n\
         Current Tasks:\n\
         {task_list}\n\
         \n\
         Provide a schedule in the following format (use emoji checkboxes):\n\
         ✅ [Time] – [Task]\n\
         ✅ [Time] – [Task]\n\
         ✅ [Time] – [Task]"
    )
}

pub fn insights_prompt(counts: &InsightCounts) -> String {
    format!(
        "Based on this task data, provide 2-3 insightful observations and productivity tips:\n\
         - Completed tasks in the last week: {}\n\
         - Overdue tasks: {}\n\
         - Upcoming tasks due this week: {}\n\
         \n\
         Format the response as bullet points with helpful observations and actionable advice.",
        counts.completed_weekly, counts.overdue, counts.upcoming
    )
}

pub fn quote_prompt() -> String {
    "Generate a short, motivational quote about productivity.\n\
     The quote should be inspiring and help someone stay motivated with their tasks.\n\
     Format it as: \"Quote text\"\n\
     \n\
     Keep it under 20 words total and different every time."
        .to_string()
}

pub fn weekly_focus_prompt(counts: &[CategoryCount]) -> String {
    match top_category(counts) {
        Some(top) => format!(
            "Based on the user's task history, they worked on {count} tasks in the \"{category}\" category last week.\n\
             Generate a friendly, encouraging suggestion for them to focus on this category again this week.\n\
             Keep it concise and actionable. Format: \"Last week, you did {count} tasks in {category}. Want to focus on {category} this week?\"",
            count = top.count,
            category = top.category,
        ),
        None => "The user did not create any tasks last week.\n\
                 Generate a friendly, encouraging one-sentence suggestion to pick a single area to focus on this week."
            .to_string(),
    }
}
