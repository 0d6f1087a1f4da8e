use crate::{
    api_error::ApiError, app_state::SharedState, auth_response::AuthResponse, login_request::LoginRequest,
    refresh_request::RefreshRequest, register_request::RegisterRequest, settings::Settings, user::User,
};
use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordHashError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub kind: TokenKind,
    pub exp: usize,
    pub iat: usize,
}

pub fn create_token(user: &User, kind: TokenKind, settings: &Settings) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let lifetime = match kind {
        TokenKind::Access => Duration::minutes(settings.jwt_expiration_in_minutes),
        TokenKind::Refresh => Duration::days(settings.refresh_expiration_in_days),
    };
    let expiry = now + lifetime;

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        kind,
        exp: expiry.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, settings: &Settings) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

pub fn hash_password(password: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordHashError(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

fn issue_tokens(user: &User, settings: &Settings) -> Result<AuthResponse, ApiError> {
    let token = create_token(user, TokenKind::Access, settings)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let refresh_token = create_token(user, TokenKind::Refresh, settings)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(AuthResponse {
        success: true,
        token,
        refresh_token,
        user: user.to_get_dto(),
    })
}

/// Run argon2 work on the blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("password task failed: {e}")))
}

pub async fn register(state: &SharedState, payload: RegisterRequest) -> Result<AuthResponse, ApiError> {
    if payload.name.trim().is_empty() || payload.email.trim().is_empty() || payload.password.trim().is_empty() {
        return Err(ApiError::Validation("Please provide a name, email and password".to_string()));
    }

    let user = run_blocking(move || User::new(payload)).await??;
    state.data_context.create_user(&user)?;

    info!(email = %user.email, "registered new user");
    issue_tokens(&user, &state.settings)
}

pub async fn login(state: &SharedState, payload: LoginRequest) -> Result<AuthResponse, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("Please provide an email and password".to_string()));
    }

    let user = state
        .data_context
        .get_user_by_email(&payload.email)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let password_hash = user.password_hash.clone();
    let valid = run_blocking(move || verify_password(&payload.password, &password_hash)).await?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    info!(email = %user.email, "user logged in");
    issue_tokens(&user, &state.settings)
}

pub fn refresh(state: &SharedState, payload: RefreshRequest) -> Result<AuthResponse, ApiError> {
    let claims = verify_token(&payload.refresh_token, &state.settings)
        .ok()
        .filter(|claims| claims.kind == TokenKind::Refresh)
        .ok_or_else(|| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

    let user = state
        .data_context
        .get_user(claims.sub)?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    debug!(email = %user.email, "refreshed session tokens");
    issue_tokens(&user, &state.settings)
}

/// Resolves the bearer token to a [`User`] and stores it in the request
/// extensions. Only access tokens are accepted.
pub async fn auth_middleware(
    State(state): State<SharedState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Missing or invalid token".to_string()))?;

    let claims = verify_token(token, &state.settings)
        .ok()
        .filter(|claims| claims.kind == TokenKind::Access)
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

    let user = state
        .data_context
        .get_user(claims.sub)?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "analytical".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn password_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn password_is_hashed_as_typed() {
        let user = User::new(RegisterRequest {
            name: "Spacey".to_string(),
            email: "spacey@example.com".to_string(),
            password: "  padded secret ".to_string(),
        })
        .unwrap();

        assert!(verify_password("  padded secret ", &user.password_hash));
        assert!(!verify_password("padded secret", &user.password_hash));
    }

    #[test]
    fn token_carries_subject_and_kind() {
        let settings = Settings::default();
        let user = user();

        let token = create_token(&user, TokenKind::Refresh, &settings).unwrap();
        let claims = verify_token(&token, &settings).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.kind, TokenKind::Refresh);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let user = user();
        let token = create_token(&user, TokenKind::Access, &Settings::default()).unwrap();

        let other = Settings {
            jwt_secret: "a-different-secret".to_string(),
            ..Settings::default()
        };
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let settings = Settings {
            jwt_expiration_in_minutes: -10,
            ..Settings::default()
        };
        let token = create_token(&user(), TokenKind::Access, &settings).unwrap();
        assert!(verify_token(&token, &settings).is_err());
    }
}
