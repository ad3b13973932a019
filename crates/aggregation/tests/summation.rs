//! Grouping and summing directories of NAME files.

use aggregation::{AggregationError, Fileset, Summation};
use chrono::NaiveDate;
use name_common::{shortname, IsoWeek, RunDirection, YearMonth};
use std::path::Path;
use test_utils::{temp_dir, NameFileBuilder};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y%m%d").unwrap()
}

/// One file per date, each cell (1, 1) holding `[v, v]` with v the day of month.
fn write_days(dir: &Path, days: &[&str]) {
    for day in days {
        let v: f64 = day[6..8].parse().unwrap();
        NameFileBuilder::new()
            .run_name(&format!("RUN_{day}"))
            .timestamps(&["13/01/2017 12:00 UTC", "13/01/2017 15:00 UTC"])
            .row(1, 1, &[v, v])
            .write_to(dir, &format!("Fields_grid1_{day}.txt"));
    }
}

fn stems(paths: &[std::path::PathBuf]) -> Vec<String> {
    paths.iter().map(|p| shortname(p)).collect()
}

#[test]
fn test_iso_week_crosses_month_boundary() {
    let dir = temp_dir();
    write_days(
        dir.path(),
        &["20170129", "20170130", "20170201", "20170205", "20170206"],
    );
    let set = Fileset::scan(dir.path()).unwrap();

    let week = set.week(IsoWeek::new(2017, 5).unwrap());
    assert_eq!(
        stems(&week),
        vec!["Fields_grid1_20170130", "Fields_grid1_20170201", "Fields_grid1_20170205"]
    );
    assert_eq!(set.month(YearMonth::new(2017, 2).unwrap()).len(), 3);
    assert_eq!(set.day(date("20170206")).len(), 1);
}

#[test]
fn test_iso_week_crosses_year_boundary() {
    let dir = temp_dir();
    write_days(dir.path(), &["20161231", "20170101", "20170102"]);
    let set = Fileset::scan(dir.path()).unwrap();

    assert_eq!(set.week(IsoWeek::new(2016, 52).unwrap()).len(), 2);
    assert_eq!(set.week(IsoWeek::new(2017, 1).unwrap()).len(), 1);
    assert_eq!(set.year(2017).len(), 2);
}

#[test]
fn test_sum_week_totals_and_metadata() {
    let dir = temp_dir();
    write_days(dir.path(), &["20170130", "20170201", "20170206"]);

    let summed = Summation::new(dir.path())
        .unwrap()
        .sum_week(IsoWeek::new(2017, 5).unwrap())
        .unwrap();

    assert_eq!(summed.files.len(), 2);
    // (30 + 30) + (1 + 1)
    assert_eq!(summed.total(), &[62.0]);
    assert_eq!(summed.run.run_name, "RUN_20170130");
    assert_eq!(summed.run.direction, RunDirection::Forwards);
    assert_eq!(summed.date, Some(date("20170130")));
    assert_eq!(
        summed.date_parts(),
        Some(("2017".to_string(), "01".to_string(), "30".to_string()))
    );

    let rows = summed.trimmed();
    assert_eq!(rows.len(), 1);
    assert_eq!((rows[0].lon, rows[0].lat, rows[0].total), (0.5, 50.5, 62.0));
}

#[test]
fn test_sum_aligns_cells_by_centre() {
    let dir = temp_dir();
    NameFileBuilder::new()
        .row(1, 1, &[1.0])
        .row(2, 1, &[2.0])
        .write_to(dir.path(), "a_20170113.txt");
    NameFileBuilder::new()
        .row(2, 1, &[10.0])
        .row(1, 2, &[5.0])
        .write_to(dir.path(), "b_20170113.txt");

    let summed = Summation::new(dir.path())
        .unwrap()
        .sum_day(date("20170113"))
        .unwrap();

    let by_centre: Vec<(f64, f64, f64)> = summed
        .trimmed()
        .iter()
        .map(|r| (r.lon, r.lat, r.total))
        .collect();
    assert_eq!(
        by_centre,
        vec![(0.5, 50.5, 1.0), (1.5, 50.5, 12.0), (0.5, 51.5, 5.0)]
    );
    assert_eq!(summed.min_max(), Some((1.0, 12.0)));
}

#[test]
fn test_text_cell_surfaces_as_nan() {
    let dir = temp_dir();
    NameFileBuilder::new()
        .raw_row(1, 1, &["oops"])
        .write_to(dir.path(), "a_20170113.txt");
    NameFileBuilder::new()
        .row(1, 1, &[1.0])
        .write_to(dir.path(), "b_20170113.txt");

    let summed = Summation::new(dir.path()).unwrap().sum_all().unwrap();
    assert!(summed.total()[0].is_nan());
}

#[test]
fn test_undated_files_only_in_sum_all() {
    let dir = temp_dir();
    write_days(dir.path(), &["20170113"]);
    NameFileBuilder::new()
        .row(1, 1, &[100.0])
        .write_to(dir.path(), "extra.txt");

    let year = Summation::new(dir.path()).unwrap().sum_year(2017).unwrap();
    assert_eq!(year.total(), &[26.0]);

    let all = Summation::new(dir.path()).unwrap().sum_all().unwrap();
    assert_eq!(all.files.len(), 2);
    assert_eq!(all.total(), &[126.0]);
}

#[test]
fn test_empty_selection_is_an_error() {
    let dir = temp_dir();
    write_days(dir.path(), &["20170113"]);
    let err = Summation::new(dir.path())
        .unwrap()
        .sum_month(YearMonth::new(2018, 3).unwrap())
        .unwrap_err();
    assert!(matches!(err, AggregationError::NoFilesSelected { .. }));
}

#[test]
fn test_unreadable_file_is_skipped() {
    let dir = temp_dir();
    write_days(dir.path(), &["20170113"]);
    std::fs::write(dir.path().join("broken_20170113.txt"), "not a NAME file\n").unwrap();

    let summed = Summation::new(dir.path())
        .unwrap()
        .sum_day(date("20170113"))
        .unwrap();
    assert_eq!(summed.files.len(), 1);
    assert_eq!(summed.total(), &[26.0]);
}

#[test]
fn test_sum_of_explicit_file_list() {
    let dir = temp_dir();
    write_days(dir.path(), &["20170113", "20170114", "20170115"]);
    let file = |day: &str| dir.path().join(format!("Fields_grid1_{day}.txt"));

    let fileset = Fileset::from_paths([file("20170115"), file("20170113")]).unwrap();
    let all = Summation::from_fileset(fileset.clone()).sum_all().unwrap();
    assert_eq!(stems(&all.files), vec!["Fields_grid1_20170113", "Fields_grid1_20170115"]);
    assert_eq!(all.total(), &[56.0]);
    assert_eq!(all.date, Some(date("20170113")));

    let err = Summation::from_fileset(fileset).sum_day(date("20170114")).unwrap_err();
    assert!(matches!(err, AggregationError::NoFilesSelected { .. }));
}
