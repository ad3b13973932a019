//! Run-level metadata shared by single files and summed file sets.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the dispersion run was modelled forwards or backwards in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunDirection {
    Forwards,
    Backwards,
}

impl RunDirection {
    /// Forwards only when the release ends strictly after it starts.
    pub fn from_release(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        if end > start {
            RunDirection::Forwards
        } else {
            RunDirection::Backwards
        }
    }
}

impl fmt::Display for RunDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunDirection::Forwards => write!(f, "Forwards"),
            RunDirection::Backwards => write!(f, "Backwards"),
        }
    }
}

/// Descriptive metadata used for captions and output names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    pub run_name: String,
    /// Normalised averaging descriptor, e.g. `3hr`
    pub averaging: String,
    /// Altitude band label, possibly empty
    pub altitude: String,
    pub direction: RunDirection,
    /// `Start of release` header value, verbatim
    pub release: String,
    /// `End of release` header value, verbatim
    pub end_release: String,
}

impl RunInfo {
    /// Release date shown in captions: start of release for forward runs,
    /// end of release for backward runs (first ten characters, `DD/MM/YYYY`).
    pub fn release_date(&self) -> &str {
        let source = match self.direction {
            RunDirection::Forwards => &self.release,
            RunDirection::Backwards => &self.end_release,
        };
        source.get(..10).unwrap_or(source)
    }
}
