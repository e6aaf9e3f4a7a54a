//! Configuration management for vegplot.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::colormaps;
use crate::error::{Result, VegplotError};

/// Command-line arguments for vegplot
#[derive(Parser, Debug)]
#[command(name = "vegplot")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the preprocessed grid CSV
    pub csv_file: PathBuf,

    /// Measurement column to plot; its last two digits are the 8-day period index
    pub column: String,

    /// Directory the PNG is written into
    pub output_dir: PathBuf,

    /// Reference year of the composite
    pub year: i32,

    /// Colorbar position: "v" (vertical) or "h" (horizontal)
    pub colorbar: String,

    /// Path to JSON configuration file
    #[arg(short, long, env = "VEGPLOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "VEGPLOT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Colormap name (winter, bugn, greens, viridis, ylgn)
    #[arg(long, env = "VEGPLOT_COLORMAP")]
    pub colormap: Option<String>,

    /// Figure width in pixels
    #[arg(long, env = "VEGPLOT_WIDTH")]
    pub width: Option<u32>,

    /// Figure height in pixels
    #[arg(long, env = "VEGPLOT_HEIGHT")]
    pub height: Option<u32>,

    /// GeoJSON file with coastline geometries
    #[arg(long, env = "VEGPLOT_COASTLINES")]
    pub coastlines: Option<PathBuf>,

    /// GeoJSON file with national border geometries
    #[arg(long, env = "VEGPLOT_BORDERS")]
    pub borders: Option<PathBuf>,

    /// GeoJSON file with land polygons
    #[arg(long, env = "VEGPLOT_LAND")]
    pub land: Option<PathBuf>,

    /// Leave layers without a GeoJSON file empty instead of using the built-in outline
    #[arg(long)]
    pub no_builtin_basemap: bool,
}

/// The five inputs that identify a single plot
#[derive(Debug, Clone)]
pub struct PlotRequest {
    pub csv_file: PathBuf,
    pub column: String,
    pub output_dir: PathBuf,
    pub year: i32,
    pub colorbar: String,
}

/// What is plotted and how it is labelled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Variable name used in the title and colorbar label
    #[serde(default = "default_variable")]
    pub variable: String,

    /// Units shown in the colorbar label
    #[serde(default = "default_units")]
    pub units: String,

    /// Output filename prefix; the file is `<prefix>_date_<date>.png`
    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,

    /// Colormap name
    #[serde(default = "default_colormap")]
    pub colormap: String,

    /// Length of one composite period in days
    #[serde(default = "default_period_days")]
    pub period_days: u32,
}

/// Geographic bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl Extent {
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        (self.min_lon..=self.max_lon).contains(&lon) && (self.min_lat..=self.max_lat).contains(&lat)
    }
}

/// Map projection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectionConfig {
    /// Lambert Conformal Conic on a sphere
    LambertConformal {
        central_latitude: f64,
        central_longitude: f64,
        standard_parallels: [f64; 2],
        #[serde(default)]
        false_easting: f64,
        #[serde(default)]
        false_northing: f64,
        #[serde(default = "default_earth_radius")]
        earth_radius: f64,
    },
    /// Longitude/latitude used directly as plane coordinates
    PlateCarree,
}

/// GeoJSON sources for the map decorations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasemapConfig {
    #[serde(default)]
    pub coastlines: Option<PathBuf>,
    #[serde(default)]
    pub borders: Option<PathBuf>,
    #[serde(default)]
    pub land: Option<PathBuf>,

    /// Use the compiled-in layers where no file is given
    #[serde(default = "default_builtin_basemap")]
    pub builtin: bool,
}

impl Default for BasemapConfig {
    fn default() -> Self {
        Self {
            coastlines: None,
            borders: None,
            land: None,
            builtin: default_builtin_basemap(),
        }
    }
}

/// Map region and decorations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_extent")]
    pub extent: Extent,

    #[serde(default)]
    pub projection: ProjectionConfig,

    /// Spacing of the lat/lon grid lines in degrees
    #[serde(default = "default_gridline_step")]
    pub gridline_step: f64,

    #[serde(default)]
    pub basemap: BasemapConfig,
}

/// Output raster settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FigureConfig {
    /// Canvas width in pixels, before cropping
    #[serde(default = "default_width")]
    pub width: u32,

    /// Canvas height in pixels, before cropping
    #[serde(default = "default_height")]
    pub height: u32,

    /// Pixel size of one font dot; derived from the width when absent
    #[serde(default)]
    pub font_scale: Option<u32>,

    /// Margin kept around the content when cropping
    #[serde(default = "default_crop_padding")]
    pub crop_padding: u32,
}

impl FigureConfig {
    pub fn font_scale(&self) -> u32 {
        self.font_scale.unwrap_or((self.width / 600).max(1))
    }
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub plot: PlotConfig,

    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub figure: FigureConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<(Self, PlotRequest)> {
        Self::from_args(Args::parse())
    }

    /// Build the configuration from parsed arguments
    pub fn from_args(args: Args) -> Result<(Self, PlotRequest)> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments
        if let Some(log_level) = args.log_level {
            config.log_level = log_level;
        }
        if let Some(colormap) = args.colormap {
            config.plot.colormap = colormap;
        }
        if let Some(width) = args.width {
            config.figure.width = width;
        }
        if let Some(height) = args.height {
            config.figure.height = height;
        }
        if args.coastlines.is_some() {
            config.map.basemap.coastlines = args.coastlines;
        }
        if args.borders.is_some() {
            config.map.basemap.borders = args.borders;
        }
        if args.land.is_some() {
            config.map.basemap.land = args.land;
        }
        if args.no_builtin_basemap {
            config.map.basemap.builtin = false;
        }

        let request = PlotRequest {
            csv_file: args.csv_file,
            column: args.column,
            output_dir: args.output_dir,
            year: args.year,
            colorbar: args.colorbar,
        };

        Ok((config, request))
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.plot = other.plot;
        self.map.extent = other.map.extent;
        self.map.projection = other.map.projection;
        self.map.gridline_step = other.map.gridline_step;
        if other.map.basemap.coastlines.is_some() {
            self.map.basemap.coastlines = other.map.basemap.coastlines;
        }
        if other.map.basemap.borders.is_some() {
            self.map.basemap.borders = other.map.basemap.borders;
        }
        if other.map.basemap.land.is_some() {
            self.map.basemap.land = other.map.basemap.land;
        }
        self.map.basemap.builtin = other.map.basemap.builtin;
        self.figure = other.figure;
        self.log_level = other.log_level;
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(VegplotError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        if self.plot.period_days == 0 {
            return Err(VegplotError::Config {
                message: "Period length must be at least one day".to_string(),
            });
        }

        colormaps::get_colormap(&self.plot.colormap).map_err(|e| VegplotError::Config {
            message: e.to_string(),
        })?;

        let extent = &self.map.extent;
        if extent.min_lon >= extent.max_lon || extent.min_lat >= extent.max_lat {
            return Err(VegplotError::Config {
                message: format!(
                    "Extent must satisfy min < max, got lon {}..{} lat {}..{}",
                    extent.min_lon, extent.max_lon, extent.min_lat, extent.max_lat
                ),
            });
        }
        if extent.min_lat < -90.0 || extent.max_lat > 90.0 {
            return Err(VegplotError::Config {
                message: "Latitude must be in the range -90 to 90".to_string(),
            });
        }

        if self.map.gridline_step.is_nan() || self.map.gridline_step <= 0.0 {
            return Err(VegplotError::Config {
                message: format!(
                    "Grid line step must be positive, got {}",
                    self.map.gridline_step
                ),
            });
        }

        if self.figure.width < 200 || self.figure.height < 200 {
            return Err(VegplotError::Config {
                message: format!(
                    "Figure must be at least 200x200 pixels, got {}x{}",
                    self.figure.width, self.figure.height
                ),
            });
        }

        if let ProjectionConfig::LambertConformal {
            standard_parallels,
            earth_radius,
            ..
        } = &self.map.projection
        {
            if standard_parallels.iter().any(|p| p.abs() >= 90.0) {
                return Err(VegplotError::Config {
                    message: "Standard parallels must lie strictly between the poles".to_string(),
                });
            }
            if (standard_parallels[0] + standard_parallels[1]).abs() < 1e-9 {
                return Err(VegplotError::Config {
                    message: "Standard parallels must not be symmetric about the equator"
                        .to_string(),
                });
            }
            if earth_radius.is_nan() || *earth_radius <= 0.0 {
                return Err(VegplotError::Config {
                    message: "Earth radius must be positive".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plot: PlotConfig::default(),
            map: MapConfig::default(),
            figure: FigureConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            variable: default_variable(),
            units: default_units(),
            filename_prefix: default_filename_prefix(),
            colormap: default_colormap(),
            period_days: default_period_days(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            extent: default_extent(),
            projection: ProjectionConfig::default(),
            gridline_step: default_gridline_step(),
            basemap: BasemapConfig::default(),
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        ProjectionConfig::LambertConformal {
            central_latitude: 49.0,
            central_longitude: 24.0,
            standard_parallels: [30.0, 60.0],
            false_easting: 6_370_000.0,
            false_northing: 6_370_000.0,
            earth_radius: default_earth_radius(),
        }
    }
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            font_scale: None,
            crop_padding: default_crop_padding(),
        }
    }
}

// Default value functions for serde
fn default_variable() -> String {
    "LAIv".to_string()
}

fn default_units() -> String {
    "m2/10 m2".to_string()
}

fn default_filename_prefix() -> String {
    "LAIv_preprocess_output_".to_string()
}

fn default_colormap() -> String {
    "winter".to_string()
}

fn default_period_days() -> u32 {
    crate::calendar::DEFAULT_PERIOD_DAYS
}

fn default_builtin_basemap() -> bool {
    true
}

fn default_extent() -> Extent {
    Extent {
        min_lon: 25.95,
        max_lon: 30.45,
        min_lat: 39.29,
        max_lat: 42.10,
    }
}

fn default_earth_radius() -> f64 {
    6_371_229.0
}

fn default_gridline_step() -> f64 {
    1.0
}

fn default_width() -> u32 {
    2400
}

fn default_height() -> u32 {
    1800
}

fn default_crop_padding() -> u32 {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}
