use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::{
    ai_gateway::client::AiGatewayError, authentication::auth::PasswordHashError,
    data_access::data_context::StoreError, task::TaskValidationError,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    AiGateway(#[from] AiGatewayError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream_status: Option<u16>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AiGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Store(StoreError::Conflict(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TaskValidationError> for ApiError {
    fn from(e: TaskValidationError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<PasswordHashError> for ApiError {
    fn from(e: PasswordHashError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::AiGateway(e) => ErrorBody {
                success: false,
                message: e.message.clone(),
                upstream_status: e.status,
            },
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                error!(error = %self, "request failed");
                ErrorBody {
                    success: false,
                    message: "Server error".to_string(),
                    upstream_status: None,
                }
            }
            _ => ErrorBody {
                success: false,
                message: self.to_string(),
                upstream_status: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_categories() {
        assert_eq!(
            ApiError::from(StoreError::Conflict("User already exists".to_string())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StoreError::Seed("boom".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn gateway_errors_are_bad_gateway() {
        let err = ApiError::from(AiGatewayError {
            status: Some(503),
            message: "overloaded".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn validation_errors_keep_their_message() {
        let err = ApiError::from(TaskValidationError::EmptyTitle);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Task title is required");
    }
}
