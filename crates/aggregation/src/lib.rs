//! Temporal grouping and summation of NAME files.
//!
//! A directory of NAME files is grouped by the `YYYYMMDD` stamp in each file
//! name. Summing a day, ISO week, month, year or the whole directory loads
//! the selected files one at a time and adds their per-file subtotals into a
//! single `total` column, aligned by cell centre.

pub mod error;
pub mod fileset;
pub mod sum;

pub use error::{AggregationError, Result};
pub use fileset::{Fileset, ScannedFile};
pub use sum::{SummedCell, SummedSet, Summation, TotalRow};
