//! Plot configuration.
//!
//! A YAML file may carry every plotting option; values given on the command
//! line take precedence. [`PlotOptions::resolve`] merges the two.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};

use name_common::{parse_day, IsoWeek, TimeSelector, YearMonth};
use renderer::{Color, ColorScale, Colormap, Paint};

use crate::cli::Args;

/// Solid colour when none is configured.
const DEFAULT_SOLID_COLOUR: &str = "blue";

// ============================================================================
// YAML configuration
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub infile: Option<PathBuf>,
    pub infiles: Vec<PathBuf>,
    pub indir: Option<PathBuf>,

    pub timestamp: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub day: Option<String>,
    pub week: Option<String>,
    pub month: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub year: Option<String>,
    pub sumall: bool,

    pub lon_bounds: Option<[f64; 2]>,
    pub lat_bounds: Option<[f64; 2]>,
    pub lon_axis: Option<Vec<f64>>,
    pub lat_axis: Option<Vec<f64>>,
    pub pixels_per_degree: Option<f64>,

    pub scale: Option<[f64; 2]>,
    pub autoscale: bool,
    pub colormap: Option<String>,
    pub solid: bool,
    pub color1: Option<String>,

    pub caption: Option<String>,
    pub runname: Option<String>,
    /// Station markers as `[lon, lat]`
    pub stations: Vec<[f64; 2]>,

    pub shapelist: Option<PathBuf>,
    pub shapelines: bool,
    pub shapecolors: bool,

    /// Extra datasets drawn in solid colours
    pub overlays: Vec<OverlaySpec>,

    pub outdir: Option<PathBuf>,
    pub outfile: Option<String>,
}

impl PlotConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read plot config from {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse plot config {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Time selector set in the file; more than one is an error.
    pub fn selector(&self) -> Result<Option<TimeSelector>> {
        let mut selectors = Vec::new();
        if let Some(t) = &self.timestamp {
            selectors.push(TimeSelector::Timestamp(t.clone()));
        }
        if let Some(day) = &self.day {
            selectors.push(TimeSelector::Day(parse_day(day)?));
        }
        if let Some(week) = &self.week {
            selectors.push(TimeSelector::Week(IsoWeek::parse(week)?));
        }
        if let Some(month) = &self.month {
            selectors.push(TimeSelector::Month(YearMonth::parse(month)?));
        }
        if let Some(year) = &self.year {
            selectors.push(TimeSelector::Year(TimeSelector::parse_year(year)?));
        }
        if self.sumall {
            selectors.push(TimeSelector::All);
        }
        if selectors.len() > 1 {
            let kinds: Vec<&str> = selectors.iter().map(TimeSelector::kind).collect();
            bail!("Time selectors are mutually exclusive, config sets {}", kinds.join(", "));
        }
        Ok(selectors.pop())
    }
}

/// Accept `20170113` as well as `"20170113"`.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }
    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

/// Extra dataset as written in the config file or on the command line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverlaySpec {
    pub path: PathBuf,
    #[serde(alias = "color")]
    pub colour: String,
}

// ============================================================================
// Resolved options
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    File(PathBuf),
    /// Several files, handled like a directory holding only them
    Files(Vec<PathBuf>),
    Dir(PathBuf),
}

impl Input {
    fn from_files(mut files: Vec<PathBuf>) -> Self {
        if files.len() == 1 {
            Input::File(files.remove(0))
        } else {
            Input::Files(files)
        }
    }
}

/// A dataset drawn over the map in one colour.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    /// NAME file, or directory matched to the main input by date stamp
    pub path: PathBuf,
    pub colour: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleMode {
    Fixed(ColorScale),
    Auto,
}

/// How cell values are coloured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapStyle {
    pub colormap: Colormap,
    pub scale: ScaleMode,
    /// Solid colour; overrides the colormap when set
    pub solid: Option<Color>,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            colormap: Colormap::default(),
            scale: ScaleMode::Fixed(ColorScale::default()),
            solid: None,
        }
    }
}

impl MapStyle {
    /// Paint for a map whose values span `min_max`.
    pub fn paint(&self, min_max: Option<(f64, f64)>) -> Paint {
        if let Some(colour) = self.solid {
            return Paint::Solid(colour);
        }
        let scale = match self.scale {
            ScaleMode::Fixed(scale) => scale,
            ScaleMode::Auto => ColorScale::auto(min_max),
        };
        Paint::Ramp {
            colormap: self.colormap,
            scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeOverlay {
    pub shape_list: PathBuf,
    pub lines: bool,
    pub colours: bool,
}

/// Everything a plotting run needs, after merging config and arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    pub input: Input,
    pub selector: Option<TimeSelector>,
    pub outdir: PathBuf,
    pub outfile: Option<String>,
    pub caption: Option<String>,
    pub runname: Option<String>,
    pub style: MapStyle,
    pub shapes: Option<ShapeOverlay>,
    pub overlays: Vec<Overlay>,
    pub lon_bounds: Option<(f64, f64)>,
    pub lat_bounds: Option<(f64, f64)>,
    pub lon_axis: Option<Vec<f64>>,
    pub lat_axis: Option<Vec<f64>>,
    pub stations: Vec<(f64, f64)>,
    pub pixels_per_degree: Option<f64>,
}

impl PlotOptions {
    pub fn resolve(args: &Args, config: PlotConfig) -> Result<Self> {
        let input = if !args.infile.is_empty() {
            Input::from_files(args.infile.clone())
        } else if let Some(dir) = &args.indir {
            Input::Dir(dir.clone())
        } else {
            let mut files = config.infiles.clone();
            files.extend(config.infile.clone());
            match (files.is_empty(), config.indir.clone()) {
                (false, Some(_)) => bail!("Config sets both input files and indir"),
                (false, None) => Input::from_files(files),
                (true, Some(dir)) => Input::Dir(dir),
                (true, None) => bail!("No input file or directory defined"),
            }
        };

        let selector = match args.selector() {
            Some(selector) => Some(selector),
            None => config.selector()?,
        };
        match (&input, &selector) {
            (Input::File(_), Some(s)) if !matches!(s, TimeSelector::Timestamp(_)) => {
                bail!("Summing by {} needs an input directory or several input files", s.kind())
            }
            (Input::Files(_) | Input::Dir(_), Some(TimeSelector::Timestamp(_))) => {
                bail!("A timestamp can only be plotted from a single input file")
            }
            _ => {}
        }

        let colormap_name = args.colormap.as_ref().or(config.colormap.as_ref());
        let colormap = match colormap_name {
            Some(name) => Colormap::from_name(name)?,
            None => Colormap::default(),
        };
        let scale = if let Some((min, max)) = args.scale {
            ScaleMode::Fixed(ColorScale::fixed(min, max)?)
        } else if args.autoscale {
            ScaleMode::Auto
        } else if let Some([min, max]) = config.scale {
            ScaleMode::Fixed(ColorScale::fixed(min, max)?)
        } else if config.autoscale {
            ScaleMode::Auto
        } else {
            ScaleMode::Fixed(ColorScale::default())
        };
        let solid = if args.solid || config.solid {
            let name = args
                .color1
                .as_deref()
                .or(config.color1.as_deref())
                .unwrap_or(DEFAULT_SOLID_COLOUR);
            Some(Color::parse(name)?)
        } else {
            None
        };

        let shapes = args
            .shapelist
            .clone()
            .or(config.shapelist)
            .map(|shape_list| ShapeOverlay {
                shape_list,
                lines: args.shapelines || config.shapelines,
                colours: args.shapecolors || config.shapecolors,
            });

        let overlay_specs = if args.overlays.is_empty() {
            config.overlays
        } else {
            args.overlays.clone()
        };
        let overlays = overlay_specs
            .into_iter()
            .map(|spec| {
                Ok(Overlay {
                    colour: Color::parse(&spec.colour)
                        .with_context(|| format!("Bad colour for overlay {}", spec.path.display()))?,
                    path: spec.path,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let pair = |a: [f64; 2]| (a[0], a[1]);
        let stations = if args.stations.is_empty() {
            config.stations.into_iter().map(pair).collect()
        } else {
            args.stations.clone()
        };

        Ok(Self {
            input,
            selector,
            outdir: args
                .outdir
                .clone()
                .or(config.outdir)
                .unwrap_or_else(|| PathBuf::from(".")),
            outfile: args.outfile.clone().or(config.outfile),
            caption: args.caption.clone().or(config.caption),
            runname: args.runname.clone().or(config.runname),
            style: MapStyle {
                colormap,
                scale,
                solid,
            },
            shapes,
            overlays,
            lon_bounds: args.lon_bounds.or(config.lon_bounds.map(pair)),
            lat_bounds: args.lat_bounds.or(config.lat_bounds.map(pair)),
            lon_axis: args.lon_axis.clone().or(config.lon_axis),
            lat_axis: args.lat_axis.clone().or(config.lat_axis),
            stations,
            pixels_per_degree: args.pixels_per_degree.or(config.pixels_per_degree),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("plotter").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_numeric_yaml_dates() {
        let config = PlotConfig::from_yaml("indir: data\nday: 20170113\n").unwrap();
        assert_eq!(config.day.as_deref(), Some("20170113"));
        assert!(matches!(config.selector().unwrap(), Some(TimeSelector::Day(_))));
    }

    #[test]
    fn test_config_selectors_are_exclusive() {
        let config = PlotConfig::from_yaml("year: 2017\nsumall: true\n").unwrap();
        assert!(config.selector().is_err());
    }

    #[test]
    fn test_command_line_wins() {
        let config = PlotConfig::from_yaml(
            "indir: from_config\ncolormap: greys\nscale: [1.0e-9, 1.0e-6]\nstations:\n  - [-9.9, 53.3]\n",
        )
        .unwrap();
        let opts = PlotOptions::resolve(
            &args(&["--indir", "from_cli", "--colormap", "viridis", "--autoscale"]),
            config,
        )
        .unwrap();
        assert_eq!(opts.input, Input::Dir(PathBuf::from("from_cli")));
        assert_eq!(opts.style.colormap, Colormap::Viridis);
        assert_eq!(opts.style.scale, ScaleMode::Auto);
        assert_eq!(opts.stations, vec![(-9.9, 53.3)]);
        assert_eq!(opts.outdir, PathBuf::from("."));
    }

    #[test]
    fn test_solid_defaults_to_blue() {
        let opts = PlotOptions::resolve(&args(&["-i", "f.txt", "--solid"]), PlotConfig::default())
            .unwrap();
        assert_eq!(opts.style.solid, Some(Color::rgb(0, 0, 255)));
        assert!(matches!(opts.style.paint(None), Paint::Solid(_)));
    }

    #[test]
    fn test_several_input_files() {
        let opts = PlotOptions::resolve(&args(&["-i", "a.txt", "b.txt", "--sumall"]), PlotConfig::default())
            .unwrap();
        assert_eq!(
            opts.input,
            Input::Files(vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")])
        );
        let opts = PlotOptions::resolve(&args(&["-i", "a.txt"]), PlotConfig::default()).unwrap();
        assert_eq!(opts.input, Input::File(PathBuf::from("a.txt")));

        let config = PlotConfig::from_yaml("infiles: [a.txt, b.txt]\nday: 20170113\n").unwrap();
        let opts = PlotOptions::resolve(&args(&[]), config).unwrap();
        assert!(matches!(opts.input, Input::Files(ref f) if f.len() == 2));
        assert!(matches!(opts.selector, Some(TimeSelector::Day(_))));
    }

    #[test]
    fn test_overlays_from_config_and_arguments() {
        let config = PlotConfig::from_yaml(
            "indir: base\noverlays:\n  - path: second\n    color: red\n  - path: third.txt\n    colour: '#00ff00'\n",
        )
        .unwrap();
        let opts = PlotOptions::resolve(&args(&[]), config.clone()).unwrap();
        assert_eq!(
            opts.overlays,
            vec![
                Overlay { path: PathBuf::from("second"), colour: Color::rgb(255, 0, 0) },
                Overlay { path: PathBuf::from("third.txt"), colour: Color::rgb(0, 255, 0) },
            ]
        );

        let opts = PlotOptions::resolve(&args(&["--overlay", "other,blue"]), config).unwrap();
        assert_eq!(
            opts.overlays,
            vec![Overlay { path: PathBuf::from("other"), colour: Color::rgb(0, 0, 255) }]
        );

        assert!(PlotOptions::resolve(&args(&["-d", "x", "--overlay", "other,nocolour"]), PlotConfig::default())
            .is_err());
        assert!(Args::try_parse_from(["plotter", "-d", "x", "--overlay", "missing-colour"]).is_err());
    }

    #[test]
    fn test_selector_needs_matching_input() {
        assert!(PlotOptions::resolve(&args(&["-i", "f.txt", "--year", "2017"]), PlotConfig::default())
            .is_err());
        assert!(PlotOptions::resolve(
            &args(&["-d", "dir", "--timestamp", "13/01/2017 12:00"]),
            PlotConfig::default()
        )
        .is_err());
        assert!(PlotOptions::resolve(
            &args(&["-i", "a.txt", "b.txt", "--timestamp", "13/01/2017 12:00"]),
            PlotConfig::default()
        )
        .is_err());
        assert!(PlotOptions::resolve(&args(&[]), PlotConfig::default()).is_err());
    }
}
