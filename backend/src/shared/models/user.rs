use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    authentication::auth::{hash_password, PasswordHashError},
    register_request::RegisterRequest,
    user_get_response::UserGetResponse,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(request: RegisterRequest) -> Result<Self, PasswordHashError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email: User::normalize_email(&request.email),
            created_at: Utc::now(),
            password_hash: hash_password(&request.password)?,
        })
    }

    pub fn to_get_dto(&self) -> UserGetResponse {
        UserGetResponse {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    /// Emails are unique case-insensitively.
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }
}
