use std::sync::Arc;
use axum::{Router, middleware, routing::get};
use crate::{app_state::AppState, authentication::auth::auth_middleware, ai_controller::AiController};

pub const ROUTER_PATH: &str = "/api/ai";

pub fn get_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route(format!("{}/priority/:task_id", ROUTER_PATH).as_str(), get(AiController::priority))
        .route(format!("{}/daily-plan", ROUTER_PATH).as_str(), get(AiController::daily_plan))
        .route(format!("{}/insights", ROUTER_PATH).as_str(), get(AiController::insights))
        .route(format!("{}/quote", ROUTER_PATH).as_str(), get(AiController::quote))
        .route(format!("{}/weekly-focus", ROUTER_PATH).as_str(), get(AiController::weekly_focus))
        .route_layer(middleware::from_fn_with_state(app_state.clone(), auth_middleware))
        .with_state(app_state)
}
