//! Reader for NAME atmospheric dispersion model field output.
//!
//! A NAME field file is plain text with a fixed layout:
//!
//! - lines 1-18: `key: value` header (run name, release times, grid)
//! - lines 20-34: field descriptor block (averaging period, altitude)
//! - line 33: per-column timestamps
//! - line 37 onward: one CSV row per grid cell
//!
//! Sections are located by line number, not by searching for markers.
//!
//! # Backward runs
//!
//! When the end of release precedes the start of release the run is
//! backwards in time. Column timestamps are then shifted so the first column
//! lines up with the end of release.

pub mod data;
pub mod error;
pub mod fields;
pub mod header;
mod reader;

pub use data::{min_max, CellKey, CellRecord, Concentration, NameData, TrimmedRow};
pub use error::{NameError, NameResult};
pub use fields::{altitude_label, FieldInfo};
pub use header::{load_header, Header};
pub use reader::{NameFile, DATA_FIRST_LINE, TIMESTAMP_LINE};
