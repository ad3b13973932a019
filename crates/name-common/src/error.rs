//! Error types shared by the NAME crates.

use thiserror::Error;

/// Result type alias using CommonError.
pub type CommonResult<T> = Result<T, CommonError>;

/// Errors raised while parsing shared value types.
#[derive(Debug, Error)]
pub enum CommonError {
    #[error("Invalid timestamp '{0}': expected DD/MM/YYYY HH:mm")]
    InvalidTimestamp(String),

    #[error("Invalid date '{0}': expected YYYYMMDD")]
    InvalidDate(String),

    #[error("Invalid time selector '{value}': {message}")]
    InvalidSelector { value: String, message: String },

    #[error("Invalid bounds '{0}': expected 'min,max'")]
    InvalidBounds(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),
}
