//! Colors, named colormaps and the logarithmic concentration scale.

use crate::error::{RenderError, Result};

/// Default fixed concentration scale (g s/m³).
pub const DEFAULT_SCALE: (f64, f64) = (5.0e-9, 1.0e-5);

/// Number of discrete colors sampled from a colormap.
const LUT_SIZE: usize = 256;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// Same color with alpha scaled by `opacity` (0-1).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Parse `#rrggbb`, `#rgb` or an HTML color name.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some((r, g, b)) = hex_to_rgb(s) {
            return Ok(Self::rgb(r, g, b));
        }
        let lower = s.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, c)| *c)
            .ok_or_else(|| RenderError::UnknownColour(s.to_string()))
    }
}

const NAMED_COLORS: [(&str, Color); 20] = [
    ("black", Color::rgb(0, 0, 0)),
    ("white", Color::rgb(255, 255, 255)),
    ("red", Color::rgb(255, 0, 0)),
    ("green", Color::rgb(0, 128, 0)),
    ("lime", Color::rgb(0, 255, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("orange", Color::rgb(255, 165, 0)),
    ("purple", Color::rgb(128, 0, 128)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("pink", Color::rgb(255, 192, 203)),
    ("brown", Color::rgb(165, 42, 42)),
    ("grey", Color::rgb(128, 128, 128)),
    ("gray", Color::rgb(128, 128, 128)),
    ("navy", Color::rgb(0, 0, 128)),
    ("teal", Color::rgb(0, 128, 128)),
    ("olive", Color::rgb(128, 128, 0)),
    ("maroon", Color::rgb(128, 0, 0)),
    ("gold", Color::rgb(255, 215, 0)),
];

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            let digit = |k: usize| u8::from_str_radix(&hex[k..k + 1], 16).ok().map(|d| d * 17);
            Some((digit(0)?, digit(1)?, digit(2)?))
        }
        _ => None,
    }
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f32 * t_inv) + (color2.r as f32 * t)).round() as u8,
        ((color1.g as f32 * t_inv) + (color2.g as f32 * t)).round() as u8,
        ((color1.b as f32 * t_inv) + (color2.b as f32 * t)).round() as u8,
        ((color1.a as f32 * t_inv) + (color2.a as f32 * t)).round() as u8,
    )
}

/// Named colormaps for concentration plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colormap {
    #[default]
    Rainbow,
    Viridis,
    Greys,
}

const VIRIDIS_STOPS: [Color; 5] = [
    Color::rgb(68, 1, 84),
    Color::rgb(59, 82, 139),
    Color::rgb(33, 145, 140),
    Color::rgb(94, 201, 98),
    Color::rgb(253, 231, 37),
];

impl Colormap {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "rainbow" => Ok(Colormap::Rainbow),
            "viridis" => Ok(Colormap::Viridis),
            "greys" | "grays" => Ok(Colormap::Greys),
            _ => Err(RenderError::UnknownColormap(name.to_string())),
        }
    }

    /// Color at position `t` in `[0, 1]`, quantised to 256 levels.
    pub fn sample(&self, t: f64) -> Color {
        let level = ((t.clamp(0.0, 1.0) * LUT_SIZE as f64) as usize).min(LUT_SIZE - 1);
        let x = level as f64 / (LUT_SIZE - 1) as f64;
        match self {
            Colormap::Rainbow => {
                let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
                Color::rgb(
                    channel((2.0 * x - 0.5).abs()),
                    channel((std::f64::consts::PI * x).sin()),
                    channel((std::f64::consts::FRAC_PI_2 * x).cos()),
                )
            }
            Colormap::Viridis => {
                let pos = x * (VIRIDIS_STOPS.len() - 1) as f64;
                let k = (pos.floor() as usize).min(VIRIDIS_STOPS.len() - 2);
                interpolate_color(VIRIDIS_STOPS[k], VIRIDIS_STOPS[k + 1], (pos - k as f64) as f32)
            }
            Colormap::Greys => {
                let v = (255.0 * (1.0 - x)).round() as u8;
                Color::rgb(v, v, v)
            }
        }
    }
}

/// Logarithmic normalisation of concentrations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            min: DEFAULT_SCALE.0,
            max: DEFAULT_SCALE.1,
        }
    }
}

impl ColorScale {
    pub fn fixed(min: f64, max: f64) -> Result<Self> {
        if !(min > 0.0 && max > min && max.is_finite()) {
            return Err(RenderError::InvalidScale { min, max });
        }
        Ok(Self { min, max })
    }

    /// Scale spanning the smallest positive and largest value.
    ///
    /// Falls back to the default scale when there is no usable range.
    pub fn auto(min_max: Option<(f64, f64)>) -> Self {
        match min_max {
            Some((min, max)) if min > 0.0 && max > min => Self { min, max },
            Some((min, _)) if min > 0.0 => Self {
                min: min / 10.0,
                max: min * 10.0,
            },
            _ => Self::default(),
        }
    }

    /// Position of `value` on the log scale; `None` for values not drawn.
    ///
    /// Values at or below zero, below `min` or NaN are not drawn; values
    /// above `max` take the top color.
    pub fn normalise(&self, value: f64) -> Option<f64> {
        if value.is_nan() || value <= 0.0 || value < self.min {
            return None;
        }
        let t = (value.log10() - self.min.log10()) / (self.max.log10() - self.min.log10());
        Some(t.min(1.0))
    }
}

/// How cell values are turned into colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    /// Log-scaled colormap
    Ramp { colormap: Colormap, scale: ColorScale },
    /// One color for every cell with a positive value
    Solid(Color),
}

impl Paint {
    /// Opacity of solid cells.
    pub const SOLID_OPACITY: f32 = 0.6;

    pub fn color(&self, value: f64) -> Option<Color> {
        match self {
            Paint::Ramp { colormap, scale } => scale.normalise(value).map(|t| colormap.sample(t)),
            Paint::Solid(color) => (value > 0.0).then(|| color.with_opacity(Self::SOLID_OPACITY)),
        }
    }
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Ramp {
            colormap: Colormap::default(),
            scale: ColorScale::default(),
        }
    }
}
