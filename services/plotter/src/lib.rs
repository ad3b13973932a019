//! NAME footprint plotter.
//!
//! Resolves plotting options from the command line and an optional YAML file,
//! loads a NAME file or sums a directory or list of them, draws optional
//! overlay datasets in solid colours, and writes PNG maps.

pub mod cli;
pub mod config;
pub mod plot;

pub use cli::Args;
pub use config::{
    Input, MapStyle, Overlay, OverlaySpec, PlotConfig, PlotOptions, ScaleMode, ShapeOverlay,
};
pub use plot::{draw_map, run, MapField, OverlayLayer};
