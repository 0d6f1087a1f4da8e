use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::{
    api_error::ApiError, app_state::SharedState, auth_response::AuthResponse, authentication::auth,
    login_request::LoginRequest, me_response::MeResponse, refresh_request::RefreshRequest,
    register_request::RegisterRequest, user::User,
};

pub struct AuthenticationController {}

impl AuthenticationController {
    pub async fn register(
        State(state): State<SharedState>,
        Json(payload): Json<RegisterRequest>,
    ) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
        auth::register(&state, payload)
            .await
            .map(|response| (StatusCode::CREATED, Json(response)))
    }

    pub async fn login(
        State(state): State<SharedState>,
        Json(payload): Json<LoginRequest>,
    ) -> Result<Json<AuthResponse>, ApiError> {
        auth::login(&state, payload).await.map(Json)
    }

    pub async fn refresh(
        State(state): State<SharedState>,
        Json(payload): Json<RefreshRequest>,
    ) -> Result<Json<AuthResponse>, ApiError> {
        auth::refresh(&state, payload).map(Json)
    }

    pub async fn me(Extension(user): Extension<User>) -> Json<MeResponse> {
        Json(MeResponse {
            success: true,
            data: user.to_get_dto(),
        })
    }
}
