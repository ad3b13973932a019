//! Map captions and default output file names.

use chrono::Duration;

use name_common::{parse_name_timestamp, RunDirection, RunInfo, TimeSelector};

use crate::error::{RenderError, Result};

/// Column label of a summed total.
pub const TOTAL_COLUMN: &str = "total";

/// Forward runs label each column by the start of its averaging window.
const FORWARD_SHIFT_HOURS: i64 = 3;

/// `"{run} {averaging} {altitude} {direction}"`, with `runname` replacing the
/// run name from the file when given.
pub fn run_prefix(run: &RunInfo, runname: Option<&str>) -> String {
    format!(
        "{} {} {} {}",
        runname.unwrap_or(&run.run_name),
        run.averaging,
        run.altitude,
        run.direction
    )
}

/// `HHmm` label of a timestamp column, or `None` for the total column.
fn column_suffix(run: &RunInfo, column: &str) -> Result<Option<String>> {
    if column == TOTAL_COLUMN {
        return Ok(None);
    }
    let mut at =
        parse_name_timestamp(column).map_err(|_| RenderError::InvalidColumn(column.to_string()))?;
    if run.direction == RunDirection::Forwards {
        at -= Duration::hours(FORWARD_SHIFT_HOURS);
    }
    Ok(Some(at.format("%H%M").to_string()))
}

/// Caption of a single-column map.
pub fn timestamp_caption(run: &RunInfo, runname: Option<&str>, column: &str) -> Result<String> {
    let suffix = column_suffix(run, column)?.unwrap_or_else(|| "Sum".to_string());
    Ok(format!(
        "{} start of release: {} {}",
        run_prefix(run, runname),
        run.release_date(),
        suffix
    ))
}

/// `{stem}_{HHmm}.png`, or `{stem}_sum_day.png` for the total column.
pub fn timestamp_filename(stem: &str, run: &RunInfo, column: &str) -> Result<String> {
    let suffix = column_suffix(run, column)?.unwrap_or_else(|| "sum_day".to_string());
    Ok(format!("{stem}_{suffix}.png"))
}

/// Caption of a summed map.
pub fn sum_caption(run: &RunInfo, runname: Option<&str>, selector: &TimeSelector) -> String {
    let prefix = run_prefix(run, runname);
    match selector {
        TimeSelector::Timestamp(t) => format!("{prefix}: {t}"),
        TimeSelector::Day(day) => format!("{prefix}: {} day sum", day.format("%Y%m%d")),
        TimeSelector::Week(week) => format!("{prefix}: {} week {} sum", week.year, week.week),
        TimeSelector::Month(month) => {
            format!("{prefix}: {} {} sum", month.year, month.month_name())
        }
        TimeSelector::Year(year) => format!("{prefix}: {year} year sum"),
        TimeSelector::All => format!("{prefix}: Summed"),
    }
}

/// Default file name of a summed map.
pub fn sum_filename(run_name: &str, selector: &TimeSelector) -> String {
    let kind = selector.kind();
    match selector {
        TimeSelector::Timestamp(_) | TimeSelector::All => format!("{run_name}_{kind}.png"),
        TimeSelector::Day(day) => format!("{run_name}_{}_{kind}.png", day.format("%Y%m%d")),
        TimeSelector::Week(week) => format!("{run_name}_{}{:02}_{kind}.png", week.year, week.week),
        TimeSelector::Month(month) => {
            format!("{run_name}_{}{:02}_{kind}.png", month.year, month.month)
        }
        TimeSelector::Year(year) => format!("{run_name}_{year}_{kind}.png"),
    }
}
