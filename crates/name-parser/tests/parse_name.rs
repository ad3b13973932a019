//! Integration tests for loading NAME files written by the fixture builder.

use name_common::RunDirection;
use name_parser::{load_header, Concentration, NameError, NameFile};
use test_utils::{assert_approx_eq, temp_dir, NameFileBuilder};

// ============================================================================
// Header and metadata
// ============================================================================

#[test]
fn test_header_fields() {
    let dir = temp_dir();
    let path = NameFileBuilder::new()
        .run_name("VOLCANO_A")
        .grid((-98.5, 10.0), (0.5, 0.25), (352, 200))
        .write_to(dir.path(), "Fields_grid1_20170113.txt");

    let header = load_header(&path).unwrap();
    assert_eq!(header.get("Run name"), Some("VOLCANO_A"));
    assert_eq!(header.get("X grid origin"), Some("-98.5"));
    assert_eq!(header.get_usize("X grid size").unwrap(), 352);

    let grid = header.grid_spec().unwrap();
    assert_eq!((grid.nx, grid.ny), (352, 200));
    assert_eq!((grid.dx, grid.dy), (0.5, 0.25));
}

#[test]
fn test_metadata_block() {
    let dir = temp_dir();
    let path = NameFileBuilder::new()
        .averaging("1day 3hr 0min integral")
        .altitude("Z = 500.0 m agl")
        .duration("2day 0hr 0min")
        .row(1, 1, &[1.0])
        .write_to(dir.path(), "run_20170113.txt");

    let name = NameFile::open(&path).unwrap();
    assert_eq!(name.fields.averaging, "1days 3hr");
    assert_eq!(name.fields.time_run, "1days");
    assert_eq!(name.fields.release_time.as_deref(), Some("3hr"));
    assert_eq!(name.fields.altitude, "(0-1000m)");
    assert_eq!(name.duration, "2days");
    assert_eq!(
        name.date_parts(),
        Some(("2017".to_string(), "01".to_string(), "13".to_string()))
    );
    assert_eq!(name.stem(), "run_20170113");
}

#[test]
fn test_unknown_altitude_gives_empty_label() {
    let dir = temp_dir();
    let path = NameFileBuilder::new()
        .altitude("Boundary layer")
        .write_to(dir.path(), "run_20170113.txt");
    let name = NameFile::open(&path).unwrap();
    assert_eq!(name.fields.altitude, "");
    assert_eq!(name.run_info().altitude, "");
}

// ============================================================================
// Table parsing
// ============================================================================

#[test]
fn test_rows_and_columns() {
    let dir = temp_dir();
    let path = NameFileBuilder::new()
        .grid((0.5, 50.5), (1.0, 1.0), (2, 2))
        .timestamps(&["13/01/2017 12:00 UTC", "13/01/2017 15:00 UTC"])
        .row(1, 1, &[1.5e-8, 0.0])
        .row(2, 1, &[0.0, 2.5e-7])
        .row(1, 2, &[3.0e-9, 4.0e-9])
        .write_to(dir.path(), "run_20170113.txt");

    let name = NameFile::open(&path).unwrap();
    assert_eq!(name.direction, RunDirection::Forwards);
    assert_eq!(
        name.timestamps(),
        &["13/01/2017 12:00 UTC".to_string(), "13/01/2017 15:00 UTC".to_string()]
    );
    assert_eq!(name.data.len(), 3);

    let row = name.data.get(1.5, 50.5).unwrap();
    assert_eq!((row.x_index, row.y_index), (2, 1));
    assert_eq!(row.values, vec![Concentration::Value(0.0), Concentration::Value(2.5e-7)]);

    let col = name.data.column("13/01/2017 12:00 UTC").unwrap();
    assert_eq!(col, vec![1.5e-8, 0.0, 3.0e-9]);
}

#[test]
fn test_non_numeric_values_kept_as_text() {
    let dir = temp_dir();
    let path = NameFileBuilder::new()
        .timestamps(&["13/01/2017 12:00 UTC", "13/01/2017 15:00 UTC"])
        .raw_row(1, 1, &["1.0E-08", "oops"])
        .write_to(dir.path(), "run_20170113.txt");

    let mut name = NameFile::open(&path).unwrap();
    let row = name.data.get(0.5, 50.5).unwrap();
    assert_eq!(row.values[0], Concentration::Value(1.0e-8));
    assert_eq!(row.values[1], Concentration::Text("oops".to_string()));

    name.add_all();
    assert!(name.data.subtotal().unwrap()[0].is_nan());
}

#[test]
fn test_row_geometry_is_grid_square() {
    use geo::Area;

    let dir = temp_dir();
    let path = NameFileBuilder::new()
        .grid((0.25, 0.25), (0.5, 0.5), (2, 2))
        .row(2, 2, &[1.0])
        .write_to(dir.path(), "run_20170113.txt");

    let name = NameFile::open(&path).unwrap();
    let row = &name.data.rows()[0];
    assert_eq!((row.lon, row.lat), (0.75, 0.75));
    assert_approx_eq!(row.geometry.unsigned_area(), 0.25, 1e-12);
}

// ============================================================================
// Run direction
// ============================================================================

#[test]
fn test_backward_run_shifts_every_column() {
    let dir = temp_dir();
    let path = NameFileBuilder::new()
        .release("02/01/2020 00:00 UTC", "01/01/2020 12:00 UTC")
        .timestamps(&["01/01/2020 00:00 UTC", "01/01/2020 03:00 UTC", "01/01/2020 06:00 UTC"])
        .row(1, 1, &[1.0, 2.0, 3.0])
        .write_to(dir.path(), "back_20200101.txt");

    let name = NameFile::open(&path).unwrap();
    assert_eq!(name.direction, RunDirection::Backwards);
    assert_eq!(
        name.timestamps(),
        &[
            "01/01/2020 12:00 UTC".to_string(),
            "01/01/2020 15:00 UTC".to_string(),
            "01/01/2020 18:00 UTC".to_string(),
        ]
    );
    // values stay attached to their (shifted) columns
    assert_eq!(name.data.column("01/01/2020 18:00 UTC").unwrap(), vec![3.0]);
    assert_eq!(name.run_info().release_date(), "01/01/2020");
}

#[test]
fn test_forward_run_keeps_labels() {
    let dir = temp_dir();
    let path = NameFileBuilder::new()
        .release("01/01/2020 00:00 UTC", "01/01/2020 12:00 UTC")
        .timestamps(&["01/01/2020 03:00 UTC"])
        .write_to(dir.path(), "fwd_20200101.txt");
    let name = NameFile::open(&path).unwrap();
    assert_eq!(name.direction, RunDirection::Forwards);
    assert_eq!(name.timestamps(), &["01/01/2020 03:00 UTC".to_string()]);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_missing_file_names_path() {
    let err = NameFile::open("/nonexistent/run_20200101.txt").unwrap_err();
    assert!(matches!(err, NameError::NotFound(_)));
    assert!(err.to_string().contains("run_20200101.txt"));
}

#[test]
fn test_truncated_file() {
    let dir = temp_dir();
    let path = dir.path().join("short_20200101.txt");
    std::fs::write(&path, "NAME III\nRun name: X\n").unwrap();
    assert!(matches!(
        NameFile::open(&path),
        Err(NameError::InvalidLayout { .. })
    ));
}

#[test]
fn test_file_without_date_still_loads() {
    let dir = temp_dir();
    let path = NameFileBuilder::new().write_to(dir.path(), "nodate.txt");
    let name = NameFile::open(&path).unwrap();
    assert!(name.date.is_none());
    assert!(name.date_parts().is_none());
}
