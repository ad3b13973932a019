//! Common types and utilities shared across the NAME footprint crates.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod grid;
pub mod run;
pub mod time;

pub use bbox::BoundingBox;
pub use crs::Crs;
pub use error::{CommonError, CommonResult};
pub use grid::{cell_bbox, cell_polygon, gridline_step, CellCentre, GridSpec};
pub use run::{RunDirection, RunInfo};
pub use time::{
    date_from_filename, format_name_timestamp, parse_day, parse_name_timestamp, shortname, IsoWeek,
    TimeSelector, YearMonth,
};
