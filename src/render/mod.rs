//! Map rendering.
//!
//! - `canvas`: drawing primitives and the projected-to-pixel viewport
//! - `font`: embedded bitmap font
//! - `colorbar`: color bar orientation, ticks and drawing
//! - `map`: composition of the map panel, decorations and labels
//! - `figure`: the owned canvas, cropping and PNG output

pub mod canvas;
pub mod colorbar;
pub mod figure;
pub mod font;
pub mod map;

pub use colorbar::ColorbarOrientation;
pub use figure::Figure;
pub use map::{MapLabels, MapRenderer};
