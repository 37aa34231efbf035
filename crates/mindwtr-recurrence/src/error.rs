use mindwtr_rrule::error::RuleError;
use thiserror::Error;

/// Recurrence engine errors
#[derive(Error, Debug)]
pub enum RecurrenceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Rule(RuleError),

    #[error("Invalid task date {value:?}: {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Invalid task document: {0}")]
    Document(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<RuleError> for RecurrenceError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::ValidationError(message) => Self::Validation(message),
            other @ RuleError::ParseError(_) => Self::Rule(other),
        }
    }
}

pub type RecurrenceResult<T> = std::result::Result<T, RecurrenceError>;
