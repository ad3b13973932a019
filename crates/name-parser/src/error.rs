//! Error types for NAME file parsing.

use name_common::CommonError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for NAME parser operations.
pub type NameResult<T> = Result<T, NameError>;

/// Error types for NAME parsing.
#[derive(Error, Debug)]
pub enum NameError {
    /// Input file does not exist
    #[error("Cannot find NAME file: {}", .0.display())]
    NotFound(PathBuf),

    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Header key absent from lines 1-18
    #[error("Missing header field: {0}")]
    MissingHeaderField(String),

    /// Header value present but not coercible
    #[error("Invalid value for header field '{key}': {value}")]
    InvalidHeaderValue { key: String, value: String },

    /// File shorter than the fixed layout or a row that cannot be indexed
    #[error("Invalid NAME layout at line {line}: {message}")]
    InvalidLayout { line: usize, message: String },

    /// Named timestamp column not present in the file
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Operation needs a subtotal that has not been computed
    #[error("No subtotal column; call add_all or add_range first")]
    MissingSubtotal,

    #[error(transparent)]
    Common(#[from] CommonError),
}
