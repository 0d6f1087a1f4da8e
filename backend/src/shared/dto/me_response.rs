use serde::{Deserialize, Serialize};

use crate::user_get_response::UserGetResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub success: bool,
    pub data: UserGetResponse,
}
