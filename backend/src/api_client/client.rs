//! Typed HTTP client for the REST surface.
//!
//! Authenticated calls go through [`ApiClient::send_authorized`], which
//! attaches the bearer token and, on a 401, refreshes the session once and
//! retries the request once.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::{
    analytics::aggregator::AnalyticsSnapshot, analytics_response::AnalyticsResponse,
    auth_response::AuthResponse, create_task_request::CreateTaskRequest,
    daily_plan_response::DailyPlanResponse, login_request::LoginRequest, me_response::MeResponse,
    message_response::MessageResponse, priority_suggestion_response::PrioritySuggestionResponse,
    quote_response::QuoteResponse, refresh_request::RefreshRequest, register_request::RegisterRequest,
    task::Task, task_insights_response::TaskInsightsResponse, task_query::TaskQuery,
    update_task_request::UpdateTaskRequest, user_get_response::UserGetResponse,
    weekly_focus_response::WeeklyFocusResponse,
};

use super::session::Session;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("session expired, sign in again")]
    Unauthorized,
    #[error("server returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
        upstream_status: Option<u16>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    upstream_status: Option<u16>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // AUTH
    pub async fn register(&self, request: &RegisterRequest) -> Result<Session, ClientError> {
        let response = self.http.post(self.url("/api/auth/register")).json(request).send().await?;
        let auth: AuthResponse = read_json(response).await?;
        Ok(auth.into())
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<Session, ClientError> {
        let response = self.http.post(self.url("/api/auth/login")).json(request).send().await?;
        let auth: AuthResponse = read_json(response).await?;
        Ok(auth.into())
    }

    pub async fn me(&self, session: &mut Session) -> Result<UserGetResponse, ClientError> {
        let url = self.url("/api/auth/me");
        let response = self.send_authorized(session, |http| http.get(&url)).await?;
        let me: MeResponse = read_json(response).await?;
        Ok(me.data)
    }

    // TASKS
    pub async fn list_tasks(&self, session: &mut Session, query: &TaskQuery) -> Result<Vec<Task>, ClientError> {
        let url = self.url("/api/tasks");
        let response = self.send_authorized(session, |http| http.get(&url).query(query)).await?;
        read_json(response).await
    }

    pub async fn get_task(&self, session: &mut Session, id: Uuid) -> Result<Task, ClientError> {
        let url = self.url(&format!("/api/tasks/{id}"));
        let response = self.send_authorized(session, |http| http.get(&url)).await?;
        read_json(response).await
    }

    pub async fn create_task(&self, session: &mut Session, request: &CreateTaskRequest) -> Result<Task, ClientError> {
        let url = self.url("/api/tasks");
        let response = self.send_authorized(session, |http| http.post(&url).json(request)).await?;
        read_json(response).await
    }

    pub async fn update_task(
        &self,
        session: &mut Session,
        id: Uuid,
        request: &UpdateTaskRequest,
    ) -> Result<Task, ClientError> {
        let url = self.url(&format!("/api/tasks/{id}"));
        let response = self.send_authorized(session, |http| http.put(&url).json(request)).await?;
        read_json(response).await
    }

    pub async fn delete_task(&self, session: &mut Session, id: Uuid) -> Result<MessageResponse, ClientError> {
        let url = self.url(&format!("/api/tasks/{id}"));
        let response = self.send_authorized(session, |http| http.delete(&url)).await?;
        read_json(response).await
    }

    pub async fn analytics(&self, session: &mut Session) -> Result<AnalyticsSnapshot, ClientError> {
        let url = self.url("/api/tasks/analytics");
        let response = self.send_authorized(session, |http| http.get(&url)).await?;
        let analytics: AnalyticsResponse = read_json(response).await?;
        Ok(analytics.data)
    }

    /// The CSV document as served, header row included.
    pub async fn export_csv(&self, session: &mut Session) -> Result<String, ClientError> {
        let url = self.url("/api/tasks/export");
        let response = self.send_authorized(session, |http| http.get(&url)).await?;
        Ok(check_status(response).await?.text().await?)
    }

    // AI
    pub async fn suggest_priority(&self, session: &mut Session, task_id: Uuid) -> Result<String, ClientError> {
        let url = self.url(&format!("/api/ai/priority/{task_id}"));
        let response = self.send_authorized(session, |http| http.get(&url)).await?;
        let body: PrioritySuggestionResponse = read_json(response).await?;
        Ok(body.suggestion)
    }

    pub async fn daily_plan(&self, session: &mut Session) -> Result<String, ClientError> {
        let url = self.url("/api/ai/daily-plan");
        let response = self.send_authorized(session, |http| http.get(&url)).await?;
        let body: DailyPlanResponse = read_json(response).await?;
        Ok(body.plan)
    }

    pub async fn task_insights(&self, session: &mut Session) -> Result<TaskInsightsResponse, ClientError> {
        let url = self.url("/api/ai/insights");
        let response = self.send_authorized(session, |http| http.get(&url)).await?;
        read_json(response).await
    }

    pub async fn motivational_quote(&self, session: &mut Session) -> Result<String, ClientError> {
        let url = self.url("/api/ai/quote");
        let response = self.send_authorized(session, |http| http.get(&url)).await?;
        let body: QuoteResponse = read_json(response).await?;
        Ok(body.quote)
    }

    pub async fn weekly_focus(&self, session: &mut Session) -> Result<WeeklyFocusResponse, ClientError> {
        let url = self.url("/api/ai/weekly-focus");
        let response = self.send_authorized(session, |http| http.get(&url)).await?;
        read_json(response).await
    }

    /// Exchange the session's refresh token for a new token pair.
    pub async fn refresh(&self, session: &mut Session) -> Result<(), ClientError> {
        let body = RefreshRequest {
            refresh_token: session.refresh_token.clone(),
        };
        let response = self.http.post(self.url("/api/auth/refresh")).json(&body).send().await?;
        if !response.status().is_success() {
            debug!(status = response.status().as_u16(), "session refresh rejected");
            return Err(ClientError::Unauthorized);
        }

        let auth: AuthResponse = response.json().await?;
        session.update(auth);
        Ok(())
    }

    /// `build` is called once per attempt, so it must not consume anything.
    async fn send_authorized<F>(&self, session: &mut Session, build: F) -> Result<Response, ClientError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let response = build(&self.http).bearer_auth(&session.access_token).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("access token rejected, refreshing session");
        self.refresh(session).await?;

        let response = build(&self.http).bearer_auth(&session.access_token).send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        Ok(response)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    Ok(check_status(response).await?.json().await?)
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<ErrorBody>(&body).ok();
    Err(ClientError::Api {
        status: status.as_u16(),
        message: parsed
            .as_ref()
            .map(|e| e.message.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or(body),
        upstream_status: parsed.and_then(|e| e.upstream_status),
    })
}
