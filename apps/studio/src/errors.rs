use thiserror::Error;

use crate::editor::persistence::PersistenceError;
use crate::editor::validation::FieldErrors;
use crate::export::ExportError;
use crate::models::DocumentError;
use crate::notify::Notification;

/// Application-level error type.
/// Every variant maps to a user-visible `Notification` so callers can surface it uniformly.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {} field(s) need attention", .0.len())]
    Validation(FieldErrors),

    #[error("No template selected")]
    MissingTemplate,

    #[error("Render error: {0}")]
    Render(String),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::MissingTemplate => "MISSING_TEMPLATE",
            AppError::Render(_) => "RENDER_ERROR",
            AppError::Export(_) => "EXPORT_ERROR",
            AppError::Persistence(_) => "PERSISTENCE_ERROR",
            AppError::Document(_) => "DOCUMENT_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The notification shown to the user for this error.
    pub fn to_notification(&self) -> Notification {
        let message = match self {
            AppError::Validation(_) => {
                "Please fill in all required fields before exporting".to_string()
            }
            AppError::MissingTemplate => {
                "No template selected. Go back and select a template.".to_string()
            }
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                "The résumé could not be rendered".to_string()
            }
            AppError::Export(e) => {
                tracing::error!("Export error: {e}");
                match e {
                    ExportError::InProgress => "An export is already in progress".to_string(),
                    _ => "Failed to export PDF. Please try again.".to_string(),
                }
            }
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {e}");
                "Save failed".to_string()
            }
            AppError::Document(e) => e.to_string(),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "Something went wrong".to_string()
            }
        };
        Notification::error(self.code(), message)
    }
}
