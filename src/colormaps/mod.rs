//! Colormap implementations for image generation.
//!
//! This module provides matplotlib-inspired sequential colormaps for
//! vegetation and land-surface variables.

pub mod colormap;
pub mod sequential;

pub use colormap::{get_colormap, lerp_color, Colormap, COLORMAP_NAMES};
pub use sequential::{GradientColormap, Winter};
