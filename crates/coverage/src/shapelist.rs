//! Shape list files: one `path,colour` entry per line.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CoverageError, Result};

/// One zone entry of a shape list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeListEntry {
    pub path: PathBuf,
    pub colour: String,
}

/// Parse shape list text. Lines without a comma are ignored.
pub fn parse_shape_list(text: &str) -> Vec<ShapeListEntry> {
    text.lines()
        .filter_map(|line| {
            let (path, colour) = line.split_once(',')?;
            let path = path.trim();
            if path.is_empty() {
                return None;
            }
            Some(ShapeListEntry {
                path: PathBuf::from(path),
                colour: colour.trim().to_string(),
            })
        })
        .collect()
}

/// Read a shape list file.
pub fn read_shape_list(path: &Path) -> Result<Vec<ShapeListEntry>> {
    if !path.is_file() {
        return Err(CoverageError::NotFound(path.to_path_buf()));
    }
    let entries = parse_shape_list(&fs::read_to_string(path)?);
    if entries.is_empty() {
        return Err(CoverageError::EmptyShapeList(path.to_path_buf()));
    }
    debug!(path = %path.display(), zones = entries.len(), "Read shape list");
    Ok(entries)
}
