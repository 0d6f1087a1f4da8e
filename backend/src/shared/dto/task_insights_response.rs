use serde::{Deserialize, Serialize};

use crate::ai_gateway::prompts::InsightCounts;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInsightsResponse {
    pub success: bool,
    pub stats: InsightCounts,
    pub insights: String,
}
