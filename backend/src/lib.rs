
//---------------------------------------
pub mod web_api {
    pub mod routes;
    pub mod controllers;
    #[cfg(test)]
    pub(crate) mod test_helpers;
}

pub use web_api::routes::{build_router, map_routes};
pub use web_api::controllers::*;
//---------------------------------------

//---------------------------------------
pub mod shared {
    pub mod models;
    pub mod dto;
    pub mod api_error;
}

pub use shared::models::*;
pub use shared::dto::*;
pub use shared::api_error::{self, ApiError};
//---------------------------------------

//---------------------------------------
pub mod authentication {
    pub mod auth;
}
//---------------------------------------

//---------------------------------------
pub mod data_access {
    pub mod data_context;
}
//---------------------------------------

//---------------------------------------
pub mod analytics {
    pub mod aggregator;
    pub mod insights;
    pub mod export;
}

pub use analytics::aggregator::aggregate;
//---------------------------------------

//---------------------------------------
pub mod ai_gateway {
    pub mod client;
    pub mod prompts;
}

pub use ai_gateway::client::{AiGateway, AiGatewayError};
//---------------------------------------

//---------------------------------------
pub mod api_client {
    pub mod session;
    pub mod client;
}

pub use api_client::client::{ApiClient, ClientError};
pub use api_client::session::Session;
//---------------------------------------
