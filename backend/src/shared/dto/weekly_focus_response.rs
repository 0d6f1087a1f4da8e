use serde::{Deserialize, Serialize};

use crate::task_category::TaskCategory;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyFocusResponse {
    pub success: bool,
    pub suggestion: String,
    pub category: Option<TaskCategory>,
    pub count: usize,
}
