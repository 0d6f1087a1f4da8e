// Requests
pub mod create_task_request;
pub mod update_task_request;
pub mod task_query;
pub mod register_request;
pub mod login_request;
pub mod refresh_request;


// Responses
pub mod auth_response;
pub mod user_get_response;
pub mod me_response;
pub mod message_response;
pub mod analytics_response;
pub mod priority_suggestion_response;
pub mod daily_plan_response;
pub mod task_insights_response;
pub mod quote_response;
pub mod weekly_focus_response;
