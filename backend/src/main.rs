use std::{error::Error, sync::Arc};

use taskpilot_server::{
    app_state::AppState, build_router, data_access::data_context::DataContext, settings::Settings, AiGateway,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let settings = Settings::load()?;
    init_tracing(&settings);

    // ── Storage ────────────────────────────────────────────────
    let data_context = DataContext::new(&settings.database_path)?;
    if data_context.ensure_default_user(settings.default_user.as_ref())? {
        info!("seeded default user from settings");
    }

    // ── Shared state ───────────────────────────────────────────
    if settings.ai.api_key.is_none() {
        warn!("no generative-language API key configured, AI routes will return 502");
    }
    let ai_gateway = AiGateway::new(settings.ai.clone())?;
    let bind_address = settings.bind_address();
    let state = Arc::new(AppState {
        data_context,
        ai_gateway,
        settings,
    });

    // ── Start ──────────────────────────────────────────────────
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(feature = "profile-console")]
fn init_tracing(_settings: &Settings) {
    console_subscriber::init();
}

#[cfg(not(feature = "profile-console"))]
fn init_tracing(settings: &Settings) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .init();
}
