use thiserror::Error;

use crate::parse::ParseError;

/// Rule parsing and validation errors
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type RuleResult<T> = std::result::Result<T, RuleError>;
