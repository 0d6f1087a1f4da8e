pub mod app_state;
pub mod settings;
pub mod user;
pub mod task;
pub mod task_status;
pub mod task_priority;
pub mod task_category;
pub mod due_date;
