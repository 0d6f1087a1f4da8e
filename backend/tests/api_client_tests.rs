//! End-to-end tests: the real router on an ephemeral port, driven through
//! `ApiClient`, with a local stand-in for the generative-language endpoint.

use std::sync::Arc;

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use taskpilot_server::{
    app_state::AppState,
    build_router,
    create_task_request::CreateTaskRequest,
    data_access::data_context::DataContext,
    login_request::LoginRequest,
    register_request::RegisterRequest,
    settings::{AiSettings, Settings},
    task_category::TaskCategory,
    task_query::TaskQuery,
    task_status::TaskStatus,
    update_task_request::UpdateTaskRequest,
    AiGateway, ApiClient, ClientError, Session,
};
use tempfile::TempDir;
use tokio::net::TcpListener;

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Upstream that answers every prompt with a fixed text.
fn echo_upstream(text: &'static str) -> Router {
    Router::new().route(
        "/v1/models/:model",
        post(move || async move {
            Json(json!({ "candidates": [ { "content": { "parts": [ { "text": text } ] } } ] }))
        }),
    )
}

fn failing_upstream() -> Router {
    Router::new().route(
        "/v1/models/:model",
        post(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": { "message": "model overloaded" } })),
            )
        }),
    )
}

struct TestApp {
    base_url: String,
    client: ApiClient,
    _dir: TempDir,
}

async fn spawn_app(upstream: Router) -> TestApp {
    let ai_base_url = format!("{}/v1", serve(upstream).await);
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        database_path: dir.path().join("app.redb").to_string_lossy().into_owned(),
        static_files_dir: None,
        default_user: None,
        ai: AiSettings {
            api_key: Some("test-key".to_string()),
            base_url: ai_base_url,
            timeout_secs: 5,
            ..AiSettings::default()
        },
        ..Settings::default()
    };

    let state = Arc::new(AppState {
        data_context: DataContext::new(&settings.database_path).unwrap(),
        ai_gateway: AiGateway::new(settings.ai.clone()).unwrap(),
        settings,
    });
    let base_url = serve(build_router(state)).await;

    TestApp {
        client: ApiClient::new(base_url.clone()).unwrap(),
        base_url,
        _dir: dir,
    }
}

async fn sign_up(client: &ApiClient, email: &str) -> Session {
    client
        .register(&RegisterRequest {
            name: "Integration".to_string(),
            email: email.to_string(),
            password: "s3cret".to_string(),
        })
        .await
        .unwrap()
}

fn new_task(title: &str) -> CreateTaskRequest {
    CreateTaskRequest {
        title: title.to_string(),
        ..CreateTaskRequest::default()
    }
}

#[tokio::test]
async fn register_then_login_yields_the_same_user() {
    let app = spawn_app(echo_upstream("unused")).await;
    let registered = sign_up(&app.client, "login@example.com").await;

    let session = app
        .client
        .login(&LoginRequest {
            email: "login@example.com".to_string(),
            password: "s3cret".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(session.user, registered.user);

    let err = app
        .client
        .login(&LoginRequest {
            email: "login@example.com".to_string(),
            password: "nope".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 401, .. }));
}

#[tokio::test]
async fn task_lifecycle_analytics_and_export() {
    let app = spawn_app(echo_upstream("unused")).await;
    let mut session = sign_up(&app.client, "tasks@example.com").await;

    let work = app
        .client
        .create_task(
            &mut session,
            &CreateTaskRequest {
                category: Some(TaskCategory::Work),
                due_date: Some("2000-01-01".to_string()),
                ..new_task("Quarterly report")
            },
        )
        .await
        .unwrap();
    let chores = app.client.create_task(&mut session, &new_task("Laundry")).await.unwrap();

    let updated = app
        .client
        .update_task(
            &mut session,
            chores.id,
            &UpdateTaskRequest {
                status: Some(TaskStatus::Completed),
                ..UpdateTaskRequest::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.completed_at.is_some());

    let only_work = app
        .client
        .list_tasks(
            &mut session,
            &TaskQuery {
                category: Some(TaskCategory::Work),
                ..TaskQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(only_work.len(), 1);
    assert_eq!(only_work[0].id, work.id);

    let snapshot = app.client.analytics(&mut session).await.unwrap();
    assert_eq!(snapshot.summary.total_tasks, 2);
    assert_eq!(snapshot.summary.completed_tasks, 1);
    assert_eq!(snapshot.summary.overdue_tasks, 1);
    assert!(snapshot.ai_insights.iter().any(|line| line.contains("1 overdue")));

    let csv = app.client.export_csv(&mut session).await.unwrap();
    assert!(csv.starts_with("Title,Description,Category,Status,Due Date,Created At\n"));
    assert_eq!(csv.lines().count(), 3);

    let removed = app.client.delete_task(&mut session, work.id).await.unwrap();
    assert_eq!(removed.message, "Task removed");
    let err = app.client.get_task(&mut session, work.id).await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 404, .. }));
}

#[tokio::test]
async fn rejected_access_token_is_refreshed_once() {
    let app = spawn_app(echo_upstream("unused")).await;
    let mut session = sign_up(&app.client, "refresh@example.com").await;

    session.access_token = "not-a-jwt".to_string();
    let me = app.client.me(&mut session).await.unwrap();

    assert_eq!(me.email, "refresh@example.com");
    assert_ne!(session.access_token, "not-a-jwt");
    assert!(!session.refresh_token.is_empty());

    session.access_token = "still-not-a-jwt".to_string();
    session.refresh_token = "also-garbage".to_string();
    let err = app.client.me(&mut session).await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
}

#[tokio::test]
async fn ai_routes_relay_generated_text() {
    let app = spawn_app(echo_upstream("High - it is already late.")).await;
    let mut session = sign_up(&app.client, "ai@example.com").await;

    let task = app
        .client
        .create_task(
            &mut session,
            &CreateTaskRequest {
                due_date: Some("2000-01-01".to_string()),
                category: Some(TaskCategory::Urgent),
                ..new_task("Renew passport")
            },
        )
        .await
        .unwrap();

    let suggestion = app.client.suggest_priority(&mut session, task.id).await.unwrap();
    assert_eq!(suggestion, "High - it is already late.");

    let plan = app.client.daily_plan(&mut session).await.unwrap();
    assert_eq!(plan, "High - it is already late.");

    let insights = app.client.task_insights(&mut session).await.unwrap();
    assert_eq!(insights.stats.overdue, 1);

    let focus = app.client.weekly_focus(&mut session).await.unwrap();
    assert_eq!(focus.category, Some(TaskCategory::Urgent));
    assert_eq!(focus.count, 1);
}

#[tokio::test]
async fn upstream_failure_surfaces_as_bad_gateway() {
    let app = spawn_app(failing_upstream()).await;
    let mut session = sign_up(&app.client, "down@example.com").await;

    let err = app.client.motivational_quote(&mut session).await.unwrap_err();
    match err {
        ClientError::Api {
            status,
            message,
            upstream_status,
        } => {
            assert_eq!(status, 502);
            assert_eq!(message, "model overloaded");
            assert_eq!(upstream_status, Some(503));
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn unauthenticated_request_body_is_json() {
    let app = spawn_app(echo_upstream("unused")).await;
    let response = reqwest::get(format!("{}/api/tasks", app.base_url)).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}
