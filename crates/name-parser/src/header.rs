//! NAME header block: `key: value` pairs on the first 18 lines.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use name_common::GridSpec;

use crate::error::{NameError, NameResult};

/// Number of header lines read, by position.
pub const HEADER_LINES: usize = 18;

pub const RUN_NAME: &str = "Run name";
pub const START_OF_RELEASE: &str = "Start of release";
pub const END_OF_RELEASE: &str = "End of release";
pub const RUN_DURATION: &str = "Run duration";
pub const X_GRID_ORIGIN: &str = "X grid origin";
pub const Y_GRID_ORIGIN: &str = "Y grid origin";
pub const X_GRID_SIZE: &str = "X grid size";
pub const Y_GRID_SIZE: &str = "Y grid size";
pub const X_GRID_RESOLUTION: &str = "X grid resolution";
pub const Y_GRID_RESOLUTION: &str = "Y grid resolution";

/// Raw header values keyed by the text before the first colon.
///
/// No type coercion happens on load; use the typed getters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    fields: HashMap<String, String>,
}

impl Header {
    /// Parse header fields from the given lines.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut fields = HashMap::new();
        for line in lines.into_iter().take(HEADER_LINES) {
            if let Some((key, value)) = line.split_once(':') {
                fields.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> NameResult<&str> {
        self.get(key)
            .ok_or_else(|| NameError::MissingHeaderField(key.to_string()))
    }

    pub fn get_f64(&self, key: &str) -> NameResult<f64> {
        let raw = self.require(key)?;
        raw.parse::<f64>().map_err(|_| NameError::InvalidHeaderValue {
            key: key.to_string(),
            value: raw.to_string(),
        })
    }

    /// Integer field; a value written as a float (`352.0`) is truncated.
    pub fn get_usize(&self, key: &str) -> NameResult<usize> {
        let raw = self.require(key)?;
        if let Ok(n) = raw.parse::<usize>() {
            return Ok(n);
        }
        match raw.parse::<f64>() {
            Ok(v) if v >= 0.0 && v.is_finite() => Ok(v.trunc() as usize),
            _ => Err(NameError::InvalidHeaderValue {
                key: key.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    /// Grid parameters from origin, resolution and size fields.
    pub fn grid_spec(&self) -> NameResult<GridSpec> {
        Ok(GridSpec::new(
            self.get_f64(X_GRID_ORIGIN)?,
            self.get_f64(Y_GRID_ORIGIN)?,
            self.get_f64(X_GRID_RESOLUTION)?,
            self.get_f64(Y_GRID_RESOLUTION)?,
            self.get_usize(X_GRID_SIZE)?,
            self.get_usize(Y_GRID_SIZE)?,
        )?)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Load and parse the header of a NAME file.
pub fn load_header(path: &Path) -> NameResult<Header> {
    if !path.is_file() {
        return Err(NameError::NotFound(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    let lines = reader
        .lines()
        .take(HEADER_LINES)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Header::from_lines(lines.iter().map(String::as_str)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_first_colon() {
        let header = Header::from_lines([
            "NAME III (version 6.5)",
            "Run time:        01/02/2017 09:14:25.677 UTC",
            "  X grid origin :   -98.5  ",
        ]);
        assert_eq!(header.get("Run time"), Some("01/02/2017 09:14:25.677 UTC"));
        assert_eq!(header.get_f64(X_GRID_ORIGIN).unwrap(), -98.5);
        assert_eq!(header.len(), 2);
    }

    #[test]
    fn test_only_first_eighteen_lines() {
        let lines: Vec<String> = (0..25).map(|i| format!("key{i}: {i}")).collect();
        let header = Header::from_lines(lines.iter().map(String::as_str));
        assert_eq!(header.len(), HEADER_LINES);
        assert!(header.get("key17").is_some());
        assert!(header.get("key18").is_none());
    }

    #[test]
    fn test_typed_getters() {
        let header = Header::from_lines(["X grid size: 352.0", "Y grid size: abc"]);
        assert_eq!(header.get_usize(X_GRID_SIZE).unwrap(), 352);
        assert!(matches!(
            header.get_usize(Y_GRID_SIZE),
            Err(NameError::InvalidHeaderValue { .. })
        ));
        assert!(matches!(
            header.get_f64(X_GRID_ORIGIN),
            Err(NameError::MissingHeaderField(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_header(Path::new("/nonexistent/name.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/name.txt"));
    }
}
