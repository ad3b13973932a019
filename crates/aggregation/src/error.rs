//! Error types for fileset scanning and summation.

use std::path::PathBuf;
use thiserror::Error;

use name_parser::NameError;

#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("input directory not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("input argument is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("no NAME files selected for {selection}")]
    NoFilesSelected { selection: String },

    #[error("directory scan failed: {0}")]
    Walk(String),

    #[error(transparent)]
    Name(#[from] NameError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AggregationError>;
