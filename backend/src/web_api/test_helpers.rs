//! Shared utilities for handler tests.
//!
//! [`TestHarness`] opens a fresh redb file in a temp directory and builds the
//! full router around it. The AI gateway has no API key, so any handler that
//! reaches the upstream fails with 502 instead of touching the network.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt; // for oneshot()

use crate::{
    ai_gateway::client::AiGateway,
    app_state::{AppState, SharedState},
    auth_response::AuthResponse,
    data_access::data_context::DataContext,
    settings::Settings,
    web_api::routes::build_router,
};

/// Holds `TempDir` so the database file outlives the harness.
pub struct TestHarness {
    pub state: SharedState,
    _temp_dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let database_path = temp_dir.path().join("test.redb");
        let settings = Settings {
            database_path: database_path.to_string_lossy().into_owned(),
            static_files_dir: None,
            default_user: None,
            ..Settings::default()
        };

        let data_context = DataContext::new(&settings.database_path).expect("failed to open test database");
        let ai_gateway = AiGateway::new(settings.ai.clone()).expect("failed to build AI gateway");

        Self {
            state: Arc::new(AppState {
                data_context,
                ai_gateway,
                settings,
            }),
            _temp_dir: temp_dir,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router().oneshot(request).await.expect("router is infallible")
    }

    /// Register a user with a fixed password and return its access token.
    pub async fn register(&self, email: &str) -> String {
        let response = self
            .send(post_json(
                "/api/auth/register",
                None,
                json!({ "name": "Tester", "email": email, "password": "password123" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: AuthResponse = read_json(response).await;
        body.token
    }
}

// ---------- Request builders ----------

fn builder(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    builder(Method::GET, uri, token).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    builder(Method::DELETE, uri, token).body(Body::empty()).unwrap()
}

pub fn post_json<T: Serialize>(uri: &str, token: Option<&str>, body: T) -> Request<Body> {
    with_json(builder(Method::POST, uri, token), body)
}

pub fn put_json<T: Serialize>(uri: &str, token: Option<&str>, body: T) -> Request<Body> {
    with_json(builder(Method::PUT, uri, token), body)
}

fn with_json<T: Serialize>(builder: axum::http::request::Builder, body: T) -> Request<Body> {
    let json = serde_json::to_string(&body).unwrap();
    builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json))
        .unwrap()
}

// ---------- Response readers ----------

pub async fn read_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let text = read_text(response).await;
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("invalid JSON body ({e}): {text}"))
}
