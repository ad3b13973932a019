//! Error types for map rendering.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("unknown colormap '{0}' (expected rainbow, viridis or greys)")]
    UnknownColormap(String),

    #[error("unknown colour '{0}'")]
    UnknownColour(String),

    #[error("invalid colour scale {min}..{max}: bounds must be positive and increasing")]
    InvalidScale { min: f64, max: f64 },

    #[error("invalid map extent: {0}")]
    InvalidExtent(String),

    #[error("invalid timestamp column '{0}'")]
    InvalidColumn(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
