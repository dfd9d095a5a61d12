use thiserror::Error;

use crate::validation::ValidationError;

/// Errors returned by timetable operations.
#[derive(Error, Debug)]
pub enum TimetableError {
    /// The draft failed one or more checks; nothing was sent.
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<ValidationError>),

    /// Save or delete without an open form.
    #[error("No assignment form is open")]
    NoDraft,

    /// The targeted record is not in the store.
    #[error("Assignment not found: {id}")]
    NotFound { id: String },

    /// The backend call failed; the store is unchanged.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Blocks or sub-slots are not contiguous.
    #[error("Invalid time axis: {0}")]
    InvalidAxis(String),

    /// A time string is not `HH:mm`.
    #[error("Invalid time: {0}")]
    InvalidTime(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Failure reported by the external assignment collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The collection could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The collection has no record with this id.
    #[error("no such record: {0}")]
    NotFound(String),

    /// The collection refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
