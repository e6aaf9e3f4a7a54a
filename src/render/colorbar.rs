//! Color bar orientation, ticks and drawing.

use image::{Rgba, RgbaImage};
use std::fmt;
use std::str::FromStr;

use super::canvas::{fill_rect, stroke_rect};
use super::font::{draw_text, draw_text_vertical, text_height, text_width};
use crate::colormaps::Colormap;
use crate::error::VegplotError;

/// Where the color bar sits relative to the map panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorbarOrientation {
    /// Right of the map
    Vertical,
    /// Beneath the map
    Horizontal,
}

impl FromStr for ColorbarOrientation {
    type Err = VegplotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v" => Ok(ColorbarOrientation::Vertical),
            "h" => Ok(ColorbarOrientation::Horizontal),
            _ => Err(VegplotError::InvalidOrientation {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ColorbarOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorbarOrientation::Vertical => write!(f, "v"),
            ColorbarOrientation::Horizontal => write!(f, "h"),
        }
    }
}

/// A round step giving roughly `target` intervals across `range`
pub fn nice_step(range: f64, target: usize) -> f64 {
    if !range.is_finite() || range <= 0.0 {
        return 1.0;
    }
    let raw = range / target.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let step = if normalized < 1.5 {
        1.0
    } else if normalized < 3.5 {
        2.0
    } else if normalized < 7.5 {
        5.0
    } else {
        10.0
    };
    step * magnitude
}

/// Tick values at multiples of a nice step inside `[min, max]`
pub fn ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    if min.is_nan() || max.is_nan() || max <= min {
        return vec![min];
    }
    let step = nice_step(max - min, target);
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

/// Tick label with as many decimals as the step needs
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10().floor()) as usize
    };
    let text = format!("{:.*}", decimals, value);
    // Avoid "-0"
    if text.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        text.trim_start_matches('-').to_string()
    } else {
        text
    }
}

/// A color bar ready to be drawn into a rectangle of the figure
pub struct Colorbar<'a> {
    pub orientation: ColorbarOrientation,
    pub colormap: &'a dyn Colormap,
    pub min: f64,
    pub max: f64,
    pub label: String,
    pub font_scale: u32,
}

const TEXT: Rgba<u8> = Rgba([0, 0, 0, 255]);
const TICKS_TARGET: usize = 6;

impl Colorbar<'_> {
    /// Draw the gradient with its outline, ticks and label. `(x, y, w, h)` is
    /// the rectangle of the gradient itself; labels are drawn outside it, to
    /// the right of a vertical bar and beneath a horizontal one.
    pub fn draw(&self, img: &mut RgbaImage, x: i64, y: i64, w: u32, h: u32) {
        if w == 0 || h == 0 {
            return;
        }
        let scale = self.font_scale;
        let tick_len = 3 * scale;
        let gap = 2 * scale;
        let outline = scale.max(1);
        let span = self.max - self.min;
        let value_at = |t: f64| self.min + t * span;
        let step = nice_step(span, TICKS_TARGET);
        let ticks = ticks(self.min, self.max, TICKS_TARGET);
        let fraction = |v: f64| {
            if span > 0.0 {
                (v - self.min) / span
            } else {
                0.5
            }
        };

        match self.orientation {
            ColorbarOrientation::Vertical => {
                for row in 0..h {
                    // Top of the bar is the maximum
                    let t = 1.0 - (row as f64 + 0.5) / h as f64;
                    let color = self.colormap.map(value_at(t), self.min, self.max);
                    fill_rect(img, x, y + row as i64, w, 1, Rgba(color));
                }
                stroke_rect(img, x, y, w, h, outline, TEXT);

                let mut label_width = 0;
                for value in &ticks {
                    let py = y + ((1.0 - fraction(*value)) * (h - 1) as f64).round() as i64;
                    fill_rect(img, x + w as i64, py, tick_len, outline, TEXT);
                    let text = format_tick(*value, step);
                    label_width = label_width.max(text_width(&text, scale));
                    draw_text(
                        img,
                        x + (w + tick_len + gap) as i64,
                        py - (text_height(scale) / 2) as i64,
                        &text,
                        scale,
                        TEXT,
                    );
                }

                let label_x = x + (w + tick_len + 3 * gap + label_width) as i64;
                let label_y = y + (h as i64 - text_width(&self.label, scale) as i64) / 2;
                draw_text_vertical(img, label_x, label_y, &self.label, scale, TEXT);
            }
            ColorbarOrientation::Horizontal => {
                for col in 0..w {
                    let t = (col as f64 + 0.5) / w as f64;
                    let color = self.colormap.map(value_at(t), self.min, self.max);
                    fill_rect(img, x + col as i64, y, 1, h, Rgba(color));
                }
                stroke_rect(img, x, y, w, h, outline, TEXT);

                for value in &ticks {
                    let px = x + (fraction(*value) * (w - 1) as f64).round() as i64;
                    fill_rect(img, px, y + h as i64, outline, tick_len, TEXT);
                    let text = format_tick(*value, step);
                    draw_text(
                        img,
                        px - (text_width(&text, scale) / 2) as i64,
                        y + (h + tick_len + gap) as i64,
                        &text,
                        scale,
                        TEXT,
                    );
                }

                let label_y = y + (h + tick_len + 3 * gap + text_height(scale)) as i64;
                let label_x = x + (w as i64 - text_width(&self.label, scale) as i64) / 2;
                draw_text(img, label_x, label_y, &self.label, scale, TEXT);
            }
        }
    }

    /// Space the ticks and label need beyond the gradient, across the bar
    pub fn decoration_size(&self) -> u32 {
        let scale = self.font_scale;
        let step = nice_step(self.max - self.min, TICKS_TARGET);
        match self.orientation {
            ColorbarOrientation::Vertical => {
                let widest = ticks(self.min, self.max, TICKS_TARGET)
                    .iter()
                    .map(|v| text_width(&format_tick(*v, step), scale))
                    .max()
                    .unwrap_or(0);
                3 * scale + 6 * scale + widest + text_height(scale)
            }
            ColorbarOrientation::Horizontal => {
                3 * scale + 6 * scale + 2 * text_height(scale)
            }
        }
    }
}
