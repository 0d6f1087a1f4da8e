use serde::{Deserialize, Serialize};

use crate::user_get_response::UserGetResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub refresh_token: String,
    pub user: UserGetResponse,
}
