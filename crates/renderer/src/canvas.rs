//! Plate carrée raster map.
//!
//! Longitude maps linearly to x and latitude to y (north up). Everything is
//! drawn with source-over alpha blending in the order the caller issues the
//! calls, so layers are painted back to front.

use geo::{LineString, Polygon};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use std::path::Path;
use tracing::debug;

use name_common::BoundingBox;

use crate::error::{RenderError, Result};
use crate::gradient::{Color, Paint};
use crate::png::create_png_auto;

/// Largest image side in pixels.
const MAX_SIDE: u32 = 8192;

/// Half-length of a station marker arm in pixels.
const MARKER_ARM: f32 = 4.0;

pub struct MapCanvas {
    bounds: BoundingBox,
    pixels_per_degree: f64,
    image: RgbaImage,
}

impl MapCanvas {
    /// Transparent canvas covering `bounds`.
    pub fn new(bounds: BoundingBox, pixels_per_degree: f64) -> Result<Self> {
        if !(bounds.width() > 0.0 && bounds.height() > 0.0) {
            return Err(RenderError::InvalidExtent(format!(
                "lon {}..{}, lat {}..{}",
                bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y
            )));
        }
        if !(pixels_per_degree > 0.0 && pixels_per_degree.is_finite()) {
            return Err(RenderError::InvalidExtent(format!(
                "{pixels_per_degree} pixels per degree"
            )));
        }
        let side = |degrees: f64| (degrees * pixels_per_degree).ceil().max(1.0);
        let (width, height) = (side(bounds.width()), side(bounds.height()));
        if width > MAX_SIDE as f64 || height > MAX_SIDE as f64 {
            return Err(RenderError::InvalidExtent(format!(
                "{width}x{height} pixels exceeds {MAX_SIDE}"
            )));
        }
        debug!(width, height, pixels_per_degree, "Created map canvas");
        Ok(Self {
            bounds,
            pixels_per_degree,
            image: RgbaImage::new(width as u32, height as u32),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Pixel position of a lon/lat point (may lie outside the image).
    pub fn to_pixel(&self, lon: f64, lat: f64) -> (f32, f32) {
        (
            ((lon - self.bounds.min_x) * self.pixels_per_degree) as f32,
            ((self.bounds.max_y - lat) * self.pixels_per_degree) as f32,
        )
    }

    pub fn fill_background(&mut self, color: Color) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([color.r, color.g, color.b, color.a]);
        }
    }

    /// Fill the pixels whose centres fall inside `rect`.
    pub fn fill_rect(&mut self, rect: &BoundingBox, color: Color) {
        let (x0, y0) = self.to_pixel(rect.min_x, rect.max_y);
        let (x1, y1) = self.to_pixel(rect.max_x, rect.min_y);
        let (width, height) = (self.width(), self.height());
        let clamp = |v: f32, max: u32| (v.round().max(0.0) as u32).min(max);
        let (xs, ys) = (clamp(x0, width)..clamp(x1, width), clamp(y0, height)..clamp(y1, height));
        for y in ys {
            for x in xs.clone() {
                blend(self.image.get_pixel_mut(x, y), color);
            }
        }
    }

    /// Paint grid cells `(extent, value)`; returns how many were drawn.
    pub fn paint_cells(
        &mut self,
        cells: impl IntoIterator<Item = (BoundingBox, f64)>,
        paint: &Paint,
    ) -> usize {
        let mut painted = 0;
        for (extent, value) in cells {
            if let Some(color) = paint.color(value) {
                self.fill_rect(&extent, color);
                painted += 1;
            }
        }
        painted
    }

    /// One-pixel lines at the given longitudes and latitudes.
    pub fn draw_gridlines(&mut self, lons: &[f64], lats: &[f64], color: Color) {
        let b = self.bounds;
        for &lon in lons.iter().filter(|&&lon| lon >= b.min_x && lon <= b.max_x) {
            self.draw_line(&[(lon, b.min_y), (lon, b.max_y)], color);
        }
        for &lat in lats.iter().filter(|&&lat| lat >= b.min_y && lat <= b.max_y) {
            self.draw_line(&[(b.min_x, lat), (b.max_x, lat)], color);
        }
    }

    /// Small cross centred on a station.
    pub fn draw_marker(&mut self, lon: f64, lat: f64, color: Color) {
        let (x, y) = self.to_pixel(lon, lat);
        let mut mask = self.mask();
        draw_line_segment_mut(&mut mask, (x - MARKER_ARM, y), (x + MARKER_ARM, y), Luma([255]));
        draw_line_segment_mut(&mut mask, (x, y - MARKER_ARM), (x, y + MARKER_ARM), Luma([255]));
        self.composite(&mask, color);
    }

    /// Fill a polygon, leaving its holes unpainted.
    pub fn fill_polygon(&mut self, polygon: &Polygon<f64>, color: Color) {
        let mut mask = self.mask();
        let Some(exterior) = self.ring_points(polygon.exterior()) else {
            return;
        };
        draw_polygon_mut(&mut mask, &exterior, Luma([255]));
        for hole in polygon.interiors() {
            if let Some(points) = self.ring_points(hole) {
                draw_polygon_mut(&mut mask, &points, Luma([0]));
            }
        }
        self.composite(&mask, color);
    }

    /// Stroke a line string (open or closed) one pixel wide.
    pub fn draw_linestring(&mut self, line: &LineString<f64>, color: Color) {
        let coords: Vec<(f64, f64)> = line.coords().map(|c| (c.x, c.y)).collect();
        self.draw_line(&coords, color);
    }

    fn draw_line(&mut self, coords: &[(f64, f64)], color: Color) {
        let mut mask = self.mask();
        for pair in coords.windows(2) {
            let start = self.to_pixel(pair[0].0, pair[0].1);
            let end = self.to_pixel(pair[1].0, pair[1].1);
            draw_line_segment_mut(&mut mask, start, end, Luma([255]));
        }
        self.composite(&mask, color);
    }

    fn mask(&self) -> GrayImage {
        GrayImage::new(self.width(), self.height())
    }

    /// Ring vertices in pixel space with repeats and the closing point
    /// removed; `None` when fewer than three remain.
    fn ring_points(&self, ring: &LineString<f64>) -> Option<Vec<Point<i32>>> {
        let mut points: Vec<Point<i32>> = Vec::with_capacity(ring.0.len());
        for c in ring.coords() {
            let (x, y) = self.to_pixel(c.x, c.y);
            let p = Point::new(x.round() as i32, y.round() as i32);
            if points.last() != Some(&p) {
                points.push(p);
            }
        }
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        (points.len() >= 3).then_some(points)
    }

    fn composite(&mut self, mask: &GrayImage, color: Color) {
        for (x, y, m) in mask.enumerate_pixels() {
            if m.0[0] > 0 {
                blend(self.image.get_pixel_mut(x, y), color);
            }
        }
    }

    /// Encode as PNG with `caption` as the `Title` text chunk.
    pub fn to_png(&self, caption: &str) -> Result<Vec<u8>> {
        self.to_png_with_text(caption, &[])
    }

    /// Encode as PNG with `caption` as `Title` followed by `extra` text chunks.
    pub fn to_png_with_text(&self, caption: &str, extra: &[(&str, &str)]) -> Result<Vec<u8>> {
        let mut text = vec![("Title", caption), ("Software", "name-footprint plotter")];
        text.extend_from_slice(extra);
        create_png_auto(
            self.image.as_raw(),
            self.width() as usize,
            self.height() as usize,
            &text,
        )
    }

    pub fn save(&self, path: &Path, caption: &str) -> Result<()> {
        self.save_with_text(path, caption, &[])
    }

    pub fn save_with_text(&self, path: &Path, caption: &str, extra: &[(&str, &str)]) -> Result<()> {
        let png = self.to_png_with_text(caption, extra)?;
        std::fs::write(path, png)?;
        debug!(path = %path.display(), "Wrote map image");
        Ok(())
    }
}

/// Source-over blend of `color` onto a straight-alpha pixel.
fn blend(dst: &mut Rgba<u8>, color: Color) {
    if color.a == 255 {
        *dst = Rgba([color.r, color.g, color.b, 255]);
        return;
    }
    if color.a == 0 {
        return;
    }
    let sa = color.a as f32 / 255.0;
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let channel = |s: u8, d: u8| {
        ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a).round().clamp(0.0, 255.0) as u8
    };
    *dst = Rgba([
        channel(color.r, dst.0[0]),
        channel(color.g, dst.0[1]),
        channel(color.b, dst.0[2]),
        (out_a * 255.0).round() as u8,
    ]);
}
