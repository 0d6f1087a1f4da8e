use std::sync::Arc;
use axum::{Router, middleware, routing::{get, post}};
use crate::{app_state::AppState, authentication::auth::auth_middleware, authentication_controller::AuthenticationController};

pub const ROUTER_PATH: &str = "/api/auth";

pub fn get_router(app_state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route(format!("{}/me", ROUTER_PATH).as_str(), get(AuthenticationController::me))
        .route_layer(middleware::from_fn_with_state(app_state.clone(), auth_middleware));

    Router::new()
        .route(format!("{}/register", ROUTER_PATH).as_str(), post(AuthenticationController::register))
        .route(format!("{}/login", ROUTER_PATH).as_str(), post(AuthenticationController::login))
        .route(format!("{}/refresh", ROUTER_PATH).as_str(), post(AuthenticationController::refresh))
        .merge(protected)
        .with_state(app_state)
}
