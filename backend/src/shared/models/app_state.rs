use std::sync::Arc;

use crate::{ai_gateway::client::AiGateway, data_access::data_context::DataContext, settings::Settings};

pub struct AppState {
    pub data_context: DataContext,
    pub ai_gateway: AiGateway,
    pub settings: Settings,
}

pub type SharedState = Arc<AppState>;
