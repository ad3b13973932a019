//! Error types for projections and shapefile reprojection.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("unsupported EPSG code: {0}")]
    UnsupportedEpsg(u32),

    #[error("unsupported CRS: {0}")]
    UnsupportedCrs(String),

    #[error("shapefile not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to access shapefile {}: {message}", path.display())]
    Shapefile { path: PathBuf, message: String },

    #[error("record {index} of {} is not a polygon", path.display())]
    NotPolygon { path: PathBuf, index: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
