//! Error types for zone loading and coverage computation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building coverage tables.
#[derive(Error, Debug)]
pub enum CoverageError {
    /// Shapefile or shape list not found.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The shapefile could not be decoded.
    #[error("failed to read shapefile {}: {message}", path.display())]
    Shapefile { path: PathBuf, message: String },

    /// The shapefile holds no polygon records.
    #[error("zone '{0}' has no polygon geometry")]
    EmptyZone(String),

    /// Two zones share the same short name.
    #[error("duplicate zone name '{0}'")]
    DuplicateZone(String),

    /// The shape list names no shapefiles.
    #[error("shape list {} contains no entries", .0.display())]
    EmptyShapeList(PathBuf),

    /// Master grid (de)serialization error.
    #[error("master grid format error: {0}")]
    Format(#[from] serde_json::Error),

    /// Storage/IO error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for coverage operations.
pub type Result<T> = std::result::Result<T, CoverageError>;
