use serde::{Deserialize, Serialize};

use crate::analytics::aggregator::AnalyticsSnapshot;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub success: bool,
    pub data: AnalyticsSnapshot,
}
