pub mod authentication_controller;
pub mod task_controller;
pub mod analytics_controller;
pub mod ai_controller;
pub mod health_controller;
