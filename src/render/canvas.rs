//! Drawing primitives on top of `imageproc`.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut, Blend};
use imageproc::point::Point;

use crate::projection::ProjectedBounds;

/// Maps projected coordinates onto a pixel panel with equal aspect ratio.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    bounds: ProjectedBounds,
    scale: f64,
    width: u32,
    height: u32,
}

impl Viewport {
    /// Largest panel fitting in `max_width x max_height` that shows `bounds`
    /// without distortion.
    pub fn fit(bounds: ProjectedBounds, max_width: u32, max_height: u32) -> Self {
        let scale = (max_width as f64 / bounds.width()).min(max_height as f64 / bounds.height());
        let width = ((bounds.width() * scale).round() as u32).clamp(1, max_width.max(1));
        let height = ((bounds.height() * scale).round() as u32).clamp(1, max_height.max(1));
        Self {
            bounds,
            scale,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel position of a projected point; y grows downward.
    pub fn to_pixel(&self, x: f64, y: f64) -> (f32, f32) {
        (
            ((x - self.bounds.min_x) * self.scale) as f32,
            ((self.bounds.max_y - y) * self.scale) as f32,
        )
    }
}

/// Line appearance
#[derive(Debug, Clone, Copy)]
pub struct Stroke {
    pub color: Rgba<u8>,
    pub width: f32,
    /// `(on, off)` lengths in pixels; solid when `None`
    pub dash: Option<(f32, f32)>,
}

impl Stroke {
    pub fn solid(color: Rgba<u8>, width: f32) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(color: Rgba<u8>, width: f32, on: f32, off: f32) -> Self {
        Self {
            color,
            width,
            dash: Some((on, off)),
        }
    }
}

/// Color with its alpha channel scaled by `alpha` in `[0, 1]`
pub fn with_alpha(color: Rgba<u8>, alpha: f64) -> Rgba<u8> {
    let a = (color[3] as f64 * alpha.clamp(0.0, 1.0)).round() as u8;
    Rgba([color[0], color[1], color[2], a])
}

/// Fill a polygon, blending translucent colors over the image.
///
/// Consecutive duplicate vertices and a repeated closing vertex are dropped;
/// a polygon that collapses below three vertices is drawn as a single pixel.
pub fn fill_polygon(img: &mut RgbaImage, points: &[(f32, f32)], color: Rgba<u8>) {
    let mut poly: Vec<Point<i32>> = Vec::with_capacity(points.len());
    for &(x, y) in points {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        let p = Point::new(x.round() as i32, y.round() as i32);
        if poly.last() != Some(&p) {
            poly.push(p);
        }
    }
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }

    let (w, h) = img.dimensions();
    let min_x = poly.iter().map(|p| p.x).min();
    let max_x = poly.iter().map(|p| p.x).max();
    let min_y = poly.iter().map(|p| p.y).min();
    let max_y = poly.iter().map(|p| p.y).max();
    match (min_x, max_x, min_y, max_y) {
        (Some(x0), Some(x1), Some(y0), Some(y1)) => {
            if x1 < 0 || y1 < 0 || x0 >= w as i32 || y0 >= h as i32 {
                return;
            }
        }
        _ => return,
    }

    if poly.len() < 3 {
        let p = poly[0];
        if p.x >= 0 && p.y >= 0 && (p.x as u32) < w && (p.y as u32) < h {
            blend_pixel(img, p.x as u32, p.y as u32, color);
        }
        return;
    }

    if color[3] == 255 {
        draw_polygon_mut(img, &poly, color);
    } else {
        let mut canvas = Blend(std::mem::take(img));
        draw_polygon_mut(&mut canvas, &poly, color);
        *img = canvas.0;
    }
}

fn blend_pixel(img: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>) {
    use image::Pixel;
    img.get_pixel_mut(x, y).blend(&color);
}

/// Clip a segment to `[0, w] x [0, h]` (Liang-Barsky). `None` when the
/// segment lies entirely outside.
pub fn clip_segment(
    start: (f32, f32),
    end: (f32, f32),
    w: f32,
    h: f32,
) -> Option<((f32, f32), (f32, f32))> {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    for (p, q) in [
        (-dx, start.0),
        (dx, w - start.0),
        (-dy, start.1),
        (dy, h - start.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }
    }

    Some((
        (start.0 + t0 * dx, start.1 + t0 * dy),
        (start.0 + t1 * dx, start.1 + t1 * dy),
    ))
}

/// Split a polyline into its dashes.
pub fn dash_polyline(points: &[(f32, f32)], on: f32, off: f32) -> Vec<Vec<(f32, f32)>> {
    let mut dashes = Vec::new();
    if on <= 0.0 || points.len() < 2 {
        return dashes;
    }
    let period = on + off.max(0.0);

    let mut phase = 0.0f32;
    let mut current: Vec<(f32, f32)> = vec![points[0]];

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let length = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
        if length == 0.0 {
            continue;
        }
        let at = |d: f32| (a.0 + (b.0 - a.0) * d / length, a.1 + (b.1 - a.1) * d / length);

        let mut travelled = 0.0f32;
        while travelled < length {
            let drawing = phase < on;
            let boundary = if drawing { on } else { period };
            let step = (boundary - phase).min(length - travelled);
            travelled += step;
            phase += step;

            if drawing {
                current.push(at(travelled));
            }
            if phase >= boundary {
                if drawing {
                    if current.len() > 1 {
                        dashes.push(std::mem::take(&mut current));
                    } else {
                        current.clear();
                    }
                } else {
                    phase = 0.0;
                    current = vec![at(travelled)];
                }
            }
        }
    }

    if current.len() > 1 {
        dashes.push(current);
    }
    dashes
}

fn draw_segment(img: &mut RgbaImage, start: (f32, f32), end: (f32, f32), stroke: &Stroke) {
    let (w, h) = img.dimensions();
    let pad = stroke.width;
    let Some((a, b)) = clip_segment(
        (start.0 + pad, start.1 + pad),
        (end.0 + pad, end.1 + pad),
        w as f32 + 2.0 * pad,
        h as f32 + 2.0 * pad,
    ) else {
        return;
    };
    let (a, b) = ((a.0 - pad, a.1 - pad), (b.0 - pad, b.1 - pad));

    if stroke.width <= 1.5 {
        let (x0, y0) = (a.0.clamp(0.0, w as f32 - 1.0), a.1.clamp(0.0, h as f32 - 1.0));
        let (x1, y1) = (b.0.clamp(0.0, w as f32 - 1.0), b.1.clamp(0.0, h as f32 - 1.0));
        if stroke.color[3] == 255 {
            draw_line_segment_mut(img, (x0, y0), (x1, y1), stroke.color);
        } else {
            let mut canvas = Blend(std::mem::take(img));
            draw_line_segment_mut(&mut canvas, (x0, y0), (x1, y1), stroke.color);
            *img = canvas.0;
        }
        return;
    }

    // Thick segments are filled as rectangles around the centre line
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return;
    }
    let half = stroke.width / 2.0;
    let (nx, ny) = (-dy / length * half, dx / length * half);
    fill_polygon(
        img,
        &[
            (a.0 + nx, a.1 + ny),
            (b.0 + nx, b.1 + ny),
            (b.0 - nx, b.1 - ny),
            (a.0 - nx, a.1 - ny),
        ],
        stroke.color,
    );
}

/// Stroke a polyline in pixel coordinates, clipped to the image.
pub fn draw_polyline(img: &mut RgbaImage, points: &[(f32, f32)], stroke: &Stroke) {
    let finite: Vec<(f32, f32)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();

    let pieces = match stroke.dash {
        Some((on, off)) => dash_polyline(&finite, on, off),
        None => vec![finite],
    };

    for piece in pieces {
        for pair in piece.windows(2) {
            draw_segment(img, pair[0], pair[1], stroke);
        }
    }
}

/// Fill an axis-aligned rectangle, clipped to the image
pub fn fill_rect(img: &mut RgbaImage, x: i64, y: i64, w: u32, h: u32, color: Rgba<u8>) {
    let (iw, ih) = img.dimensions();
    let x0 = x.clamp(0, iw as i64) as u32;
    let y0 = y.clamp(0, ih as i64) as u32;
    let x1 = (x + w as i64).clamp(0, iw as i64) as u32;
    let y1 = (y + h as i64).clamp(0, ih as i64) as u32;
    for py in y0..y1 {
        for px in x0..x1 {
            img.put_pixel(px, py, color);
        }
    }
}

/// Outline an axis-aligned rectangle with `thickness` pixels inside its edge
pub fn stroke_rect(img: &mut RgbaImage, x: i64, y: i64, w: u32, h: u32, thickness: u32, color: Rgba<u8>) {
    let t = thickness.min(w).min(h);
    fill_rect(img, x, y, w, t, color);
    fill_rect(img, x, y + h as i64 - t as i64, w, t, color);
    fill_rect(img, x, y, t, h, color);
    fill_rect(img, x + w as i64 - t as i64, y, t, h, color);
}
