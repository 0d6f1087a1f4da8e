pub mod authentication_routes;
pub mod task_routes;
pub mod ai_routes;
pub mod health_routes;

use axum::{http::HeaderValue, Router};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use crate::app_state::SharedState;

pub fn map_routes(app_state: SharedState) -> Router {
    Router::new()
        .merge(authentication_routes::get_router(app_state.clone()))
        .merge(task_routes::get_router(app_state.clone()))
        .merge(ai_routes::get_router(app_state.clone()))
        .merge(health_routes::get_router(app_state))
}

/// The full application: API routes, the SPA fallback when a static
/// directory is configured, CORS and request tracing.
pub fn build_router(app_state: SharedState) -> Router {
    let static_files_dir = app_state.settings.static_files_dir.clone();
    let cors = cors_layer(app_state.settings.cors_allowed_origin.as_deref());

    let mut router = map_routes(app_state);
    if let Some(dir) = static_files_dir.filter(|dir| !dir.is_empty()) {
        router = router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
    }

    router.layer(cors).layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let origin = match allowed_origin.filter(|origin| !origin.is_empty()) {
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!(%origin, "invalid CORS origin, allowing any origin");
                AllowOrigin::any()
            }
        },
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
