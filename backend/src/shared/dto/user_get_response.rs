use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGetResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}
