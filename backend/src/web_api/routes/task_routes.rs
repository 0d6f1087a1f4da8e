use std::sync::Arc;
use axum::{Router, middleware, routing::get};
use crate::{
    app_state::AppState, authentication::auth::auth_middleware,
    analytics_controller::AnalyticsController, task_controller::TaskController,
};

pub const ROUTER_PATH: &str = "/api/tasks";

pub fn get_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route(ROUTER_PATH, get(TaskController::get_all).post(TaskController::add))
        .route(format!("{}/analytics", ROUTER_PATH).as_str(), get(AnalyticsController::analytics))
        .route(format!("{}/export", ROUTER_PATH).as_str(), get(AnalyticsController::export))
        .route(
            format!("{}/:id", ROUTER_PATH).as_str(),
            get(TaskController::get).put(TaskController::edit).delete(TaskController::delete),
        )
        .route_layer(middleware::from_fn_with_state(app_state.clone(), auth_middleware))
        .with_state(app_state)
}
