//! Fixtures for tests across the NAME footprint crates.
//!
//! [`NameFileBuilder`] writes small NAME concentration files with a valid
//! 36-line header. [`write_zone`], [`write_rect_zone`] and
//! [`write_shape_list`] produce polygon shapefiles and the shape list that
//! names them. Everything is written under a [`temp_dir`].
//!
//! ```ignore
//! use test_utils::{temp_dir, write_rect_zone, NameFileBuilder};
//!
//! let dir = temp_dir();
//! let name = NameFileBuilder::new().row(1, 1, &[1e-6]).write_to(dir.path(), "run_20170113.txt");
//! let zone = write_rect_zone(dir.path(), "uk", &[(0.0, 50.0, 2.0, 52.0)]);
//! ```

pub mod fixtures;
pub mod shapes;

pub use fixtures::*;
pub use shapes::*;

/// Tolerance used by [`assert_approx_eq!`] when none is given; covering
/// factors are compared at this precision.
pub const FACTOR_TOLERANCE: f64 = 1e-9;

/// Assert two floats differ by at most a tolerance (default
/// [`FACTOR_TOLERANCE`]).
///
/// ```ignore
/// assert_approx_eq!(cover_factor(&cell, &zone), 0.75);
/// assert_approx_eq!(total, 4e-7, 1e-15);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr) => {
        $crate::assert_approx_eq!($left, $right, $crate::FACTOR_TOLERANCE)
    };
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let (left, right, tolerance): (f64, f64, f64) = ($left, $right, $tolerance);
        assert!(
            (left - right).abs() <= tolerance,
            "{} = {left} is not within {tolerance} of {} = {right}",
            stringify!($left),
            stringify!($right),
        );
    }};
}

/// Fresh temporary directory, removed on drop.
pub fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}
