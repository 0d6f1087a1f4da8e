use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPlanResponse {
    pub success: bool,
    pub plan: String,
}
