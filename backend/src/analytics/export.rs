//! CSV rendering of a user's task list.

use std::string::FromUtf8Error;

use thiserror::Error;

use crate::task::Task;

pub const CSV_HEADER: [&str; 6] = ["Title", "Description", "Category", "Status", "Due Date", "Created At"];
pub const EXPORT_FILENAME: &str = "tasks-export.csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV buffer flush failed: {0}")]
    Flush(#[from] std::io::Error),
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

pub fn tasks_to_csv(tasks: &[Task]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for task in tasks {
        writer.write_record([
            task.title.as_str(),
            task.description.as_deref().unwrap_or_default(),
            task.category.as_str(),
            task.status.as_str(),
            task.due_date.as_deref().unwrap_or_default(),
            task.created_at.to_rfc3339().as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
