//! Field descriptor block: averaging period and altitude band.
//!
//! Line 20 is the descriptor header row and the 14 lines after it describe
//! each field column. Only two rows are used: "Time Av or Int" (row 6) and
//! the altitude row (row 13).

/// 1-based line of the field descriptor header row.
pub const FIELD_HEADER_LINE: usize = 20;
/// Number of descriptor rows read after the header row.
pub const FIELD_ROWS: usize = 14;
/// Row offset (after the header row) of the averaging descriptor.
pub const AVERAGING_ROW: usize = 6;
/// Row offset (after the header row) of the altitude descriptor.
pub const ALTITUDE_ROW: usize = 13;
/// Leading identifier columns dropped from descriptor rows.
const PRELIMINARY_COLS: usize = 4;

/// Altitude marker substrings and their labels, checked in order.
const ALTITUDE_LABELS: [(&str, &str); 6] = [
    ("Z = 50.0", "(0-100m)"),
    ("Z = 500.0", "(0-1000m)"),
    ("Z = 550.0", "(100-1000m)"),
    ("Z = 2500.0", "(0-5000m)"),
    ("Z = 5500.0", "(1-10km)"),
    ("Z = 7000.0", "(4-10km)"),
];

/// Altitude band label for a descriptor; empty when no marker matches.
pub fn altitude_label(descriptor: &str) -> &'static str {
    ALTITUDE_LABELS
        .iter()
        .find(|(marker, _)| descriptor.contains(marker))
        .map(|(_, label)| *label)
        .unwrap_or("")
}

/// Tidy a duration string: `1day 0hr 0min` becomes `1days`.
pub fn normalise_duration(raw: &str) -> String {
    raw.replace("day ", "days ")
        .replace(" 0hr", "")
        .replace(" 0min", "")
}

/// Tidy an averaging string: `3hr 0min integral` becomes `3hr`.
pub fn normalise_averaging(raw: &str) -> String {
    normalise_duration(&raw.replace(" integral", ""))
}

/// Averaging and altitude information for the field columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Averaging descriptor as written in the file
    pub averaging_raw: String,
    /// Normalised averaging descriptor
    pub averaging: String,
    /// First token of the normalised averaging descriptor
    pub time_run: String,
    /// Second token of the normalised averaging descriptor, if any
    pub release_time: Option<String>,
    /// Altitude descriptor as written in the file
    pub altitude_raw: String,
    /// Altitude band label, possibly empty
    pub altitude: String,
}

impl FieldInfo {
    /// Build from the descriptor rows that follow the header row.
    pub fn from_rows(rows: &[&str]) -> Self {
        let averaging_raw = first_field(rows.get(AVERAGING_ROW).copied());
        let altitude_raw = first_field(rows.get(ALTITUDE_ROW).copied());

        let averaging = normalise_averaging(&averaging_raw);
        let mut tokens = averaging.split_whitespace();
        let time_run = tokens.next().unwrap_or_default().to_string();
        let release_time = tokens.next().map(str::to_string);

        let altitude = altitude_label(&altitude_raw).to_string();

        Self {
            averaging_raw,
            averaging,
            time_run,
            release_time,
            altitude_raw,
            altitude,
        }
    }
}

/// Value of the first field column of a descriptor row.
fn first_field(row: Option<&str>) -> String {
    row.and_then(|r| r.split(',').nth(PRELIMINARY_COLS))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
