use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrioritySuggestionResponse {
    pub success: bool,
    pub suggestion: String,
}
