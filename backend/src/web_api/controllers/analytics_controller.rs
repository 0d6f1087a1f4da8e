use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use tracing::debug;

use crate::{
    analytics::{
        aggregator::aggregate,
        export::{tasks_to_csv, EXPORT_FILENAME},
    },
    analytics_response::AnalyticsResponse,
    api_error::ApiError,
    app_state::SharedState,
    user::User,
};

pub struct AnalyticsController {}

impl AnalyticsController {
    pub async fn analytics(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
    ) -> Result<Json<AnalyticsResponse>, ApiError> {
        let tasks = state.data_context.list_tasks(user.id)?;
        let data = aggregate(&tasks, Utc::now());

        debug!(user_id = %user.id, total = data.summary.total_tasks, "computed analytics");
        Ok(Json(AnalyticsResponse { success: true, data }))
    }

    pub async fn export(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
    ) -> Result<Response, ApiError> {
        let tasks = state.data_context.list_tasks(user.id)?;
        let csv = tasks_to_csv(&tasks).map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok((
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={EXPORT_FILENAME}"),
                ),
            ],
            csv,
        )
            .into_response())
    }
}
