//! Colormap trait and utilities.
//!
//! This module defines the common interface for all colormaps.

use crate::error::{Result, VegplotError};

/// Names accepted by [`get_colormap`]
pub const COLORMAP_NAMES: [&str; 5] = ["winter", "bugn", "greens", "viridis", "ylgn"];

/// Trait for color mapping implementations
pub trait Colormap {
    /// Map a normalized value (0.0 to 1.0) to an RGBA color
    fn map_normalized(&self, value: f64) -> [u8; 4];

    /// Map a value to an RGBA color given the data range
    fn map(&self, value: f64, min: f64, max: f64) -> [u8; 4] {
        let normalized = if max > min {
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.5
        };
        self.map_normalized(normalized)
    }

    /// Get the name of this colormap
    fn name(&self) -> &str;
}

/// Get a colormap by name
pub fn get_colormap(name: &str) -> Result<Box<dyn Colormap>> {
    use super::sequential::{GradientColormap, Winter};

    match name.to_lowercase().as_str() {
        "winter" => Ok(Box::new(Winter)),
        "bugn" => Ok(Box::new(GradientColormap::new("bugn", colorgrad::bu_gn()))),
        "greens" => Ok(Box::new(GradientColormap::new("greens", colorgrad::greens()))),
        "viridis" => Ok(Box::new(GradientColormap::new("viridis", colorgrad::viridis()))),
        "ylgn" => Ok(Box::new(GradientColormap::new("ylgn", colorgrad::yl_gn()))),
        _ => Err(VegplotError::InvalidParameter {
            param: "colormap".to_string(),
            message: format!(
                "Unknown colormap: {}. Must be one of: {}",
                name,
                COLORMAP_NAMES.join(", ")
            ),
        }),
    }
}

/// Linear interpolation between two colors
pub fn lerp_color(c1: [u8; 3], c2: [u8; 3], t: f64) -> [u8; 3] {
    [
        (c1[0] as f64 * (1.0 - t) + c2[0] as f64 * t).round() as u8,
        (c1[1] as f64 * (1.0 - t) + c2[1] as f64 * t).round() as u8,
        (c1[2] as f64 * (1.0 - t) + c2[2] as f64 * t).round() as u8,
    ]
}
