//! Map projections for zone shapefiles.
//!
//! Supports WGS84 longitude/latitude (EPSG:4326) and spherical Web Mercator
//! (EPSG:3857), implemented directly without an external projection library.
//! [`reproject_shapefile`] moves a polygon shapefile between the two.

pub mod error;
pub mod mercator;
pub mod projection;
pub mod reproject;

pub use error::{ProjectionError, Result};
pub use projection::Projection;
pub use reproject::{output_path, reproject_shapefile, source_projection};
