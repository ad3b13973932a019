//! Map rendering for NAME concentration fields.
//!
//! - Log-scaled colormaps and solid fills ([`gradient`])
//! - Plate carrée raster canvas with zone overlays ([`canvas`])
//! - Captions and default output names ([`caption`])
//! - PNG encoding with caption metadata ([`png`])

pub mod canvas;
pub mod caption;
pub mod error;
pub mod gradient;
pub mod png;

pub use canvas::MapCanvas;
pub use caption::{
    run_prefix, sum_caption, sum_filename, timestamp_caption, timestamp_filename, TOTAL_COLUMN,
};
pub use error::{RenderError, Result};
pub use gradient::{Color, ColorScale, Colormap, Paint, DEFAULT_SCALE};
