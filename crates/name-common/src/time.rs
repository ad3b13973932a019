//! Time handling for NAME files: column timestamps, filename date stamps and
//! the temporal selectors used for aggregation.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::CommonError;

/// Timestamp layout used in NAME headers and column labels.
const NAME_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Parse a NAME timestamp such as `13/01/2017 09:00 UTC`.
///
/// Anything after the minutes (typically ` UTC`) is ignored.
pub fn parse_name_timestamp(s: &str) -> Result<NaiveDateTime, CommonError> {
    let trimmed = s.trim();
    NaiveDateTime::parse_and_remainder(trimmed, NAME_TIMESTAMP_FORMAT)
        .map(|(dt, _rest)| dt)
        .map_err(|_| CommonError::InvalidTimestamp(s.to_string()))
}

/// Format a timestamp the way shifted column labels are written.
pub fn format_name_timestamp(dt: &NaiveDateTime) -> String {
    format!("{} UTC", dt.format(NAME_TIMESTAMP_FORMAT))
}

/// Basename of a path without its extension.
pub fn shortname(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Extract the first valid `YYYYMMDD` date embedded in a file name.
pub fn date_from_filename(name: &str) -> Option<NaiveDate> {
    let bytes = name.as_bytes();
    if bytes.len() < 8 {
        return None;
    }
    (0..=bytes.len() - 8)
        .filter(|&start| bytes[start..start + 8].iter().all(u8::is_ascii_digit))
        .find_map(|start| parse_day(&name[start..start + 8]).ok())
}

/// Parse a `YYYYMMDD` day.
pub fn parse_day(s: &str) -> Result<NaiveDate, CommonError> {
    let s = s.trim();
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CommonError::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, "%Y%m%d").map_err(|_| CommonError::InvalidDate(s.to_string()))
}

/// An ISO-8601 week: ISO year plus week number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IsoWeek {
    pub year: i32,
    pub week: u32,
}

impl IsoWeek {
    pub fn new(year: i32, week: u32) -> Result<Self, CommonError> {
        // Week 53 only exists in some years; Monday of the week must resolve.
        NaiveDate::from_isoywd_opt(year, week, chrono::Weekday::Mon).ok_or_else(|| {
            CommonError::InvalidSelector {
                value: format!("{year}-W{week:02}"),
                message: "no such ISO week".to_string(),
            }
        })?;
        Ok(Self { year, week })
    }

    pub fn of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }

    /// Parse `YYYY-Www` (also accepts `YYYY-ww`).
    pub fn parse(s: &str) -> Result<Self, CommonError> {
        let invalid = |message: &str| CommonError::InvalidSelector {
            value: s.to_string(),
            message: message.to_string(),
        };
        let (year, week) = s.trim().split_once('-').ok_or_else(|| invalid("expected YYYY-Www"))?;
        let week = week.trim_start_matches(['W', 'w']);
        let year = year.parse::<i32>().map_err(|_| invalid("bad year"))?;
        let week = week.parse::<u32>().map_err(|_| invalid("bad week number"))?;
        Self::new(year, week)
    }
}

impl fmt::Display for IsoWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// A calendar month of a given year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, CommonError> {
        if !(1..=12).contains(&month) {
            return Err(CommonError::InvalidSelector {
                value: format!("{year}-{month:02}"),
                message: "month must be 1-12".to_string(),
            });
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse `YYYY-MM`.
    pub fn parse(s: &str) -> Result<Self, CommonError> {
        let invalid = || CommonError::InvalidSelector {
            value: s.to_string(),
            message: "expected YYYY-MM".to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month)
    }

    /// English month name, for captions.
    pub fn month_name(&self) -> &'static str {
        const NAMES: [&str; 12] = [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ];
        NAMES[(self.month as usize - 1) % 12]
    }
}

/// Which slice of the data a plotting run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeSelector {
    /// One timestamp column of a single file
    Timestamp(String),
    Day(NaiveDate),
    Week(IsoWeek),
    Month(YearMonth),
    Year(i32),
    /// Every file in the directory
    All,
}

impl TimeSelector {
    /// Suffix used in output file names (`daily`, `weekly`, ...).
    pub fn kind(&self) -> &'static str {
        match self {
            TimeSelector::Timestamp(_) => "timestamp",
            TimeSelector::Day(_) => "daily",
            TimeSelector::Week(_) => "weekly",
            TimeSelector::Month(_) => "monthly",
            TimeSelector::Year(_) => "yearly",
            TimeSelector::All => "summed_all",
        }
    }

    pub fn parse_year(s: &str) -> Result<i32, CommonError> {
        let s = s.trim();
        if s.len() != 4 {
            return Err(CommonError::InvalidSelector {
                value: s.to_string(),
                message: "expected YYYY".to_string(),
            });
        }
        s.parse::<i32>().map_err(|_| CommonError::InvalidSelector {
            value: s.to_string(),
            message: "expected YYYY".to_string(),
        })
    }
}
