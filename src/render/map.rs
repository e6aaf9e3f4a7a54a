//! Map figure composition.
//!
//! The map panel is drawn on its own raster so every layer is clipped to the
//! panel, then placed on the figure together with the title, the longitude
//! labels and the color bar.

use image::{Rgba, RgbaImage};
use ndarray::{Array1, Array2, ArrayView1};
use std::time::Instant;
use tracing::debug;

use super::canvas::{draw_polyline, fill_polygon, stroke_rect, with_alpha, Stroke, Viewport};
use super::colorbar::{Colorbar, ColorbarOrientation};
use super::figure::Figure;
use super::font::{draw_text_centered, text_height};
use crate::basemap::Basemap;
use crate::colormaps::{get_colormap, Colormap};
use crate::config::{Extent, FigureConfig, MapConfig};
use crate::error::Result;
use crate::grid::Grid;
use crate::logging::log_timed_operation;
use crate::projection::{build_projection, projected_bounds, ProjectedBounds, Projection};

const OCEAN: Rgba<u8> = Rgba([173, 216, 230, 255]);
const LAND: Rgba<u8> = Rgba([255, 218, 185, 255]);
const LINE: Rgba<u8> = Rgba([0, 0, 0, 255]);
const GRIDLINE: Rgba<u8> = Rgba([75, 0, 130, 255]);
const TEXT: Rgba<u8> = Rgba([0, 0, 0, 255]);

const COASTLINE_ALPHA: f64 = 0.8;
const GRIDLINE_ALPHA: f64 = 0.5;
/// Vertices per drawn grid line
const GRIDLINE_SAMPLES: usize = 200;
/// Share of the panel side the color bar spans
const COLORBAR_SHRINK: f64 = 0.8;

/// Labels of a rendered map
#[derive(Debug, Clone)]
pub struct MapLabels {
    pub title: String,
    pub colorbar_label: String,
}

/// Renders a grid on the configured map projection.
pub struct MapRenderer {
    projection: Box<dyn Projection>,
    bounds: ProjectedBounds,
    extent: Extent,
    gridline_step: f64,
    colormap: Box<dyn Colormap>,
    figure: FigureConfig,
}

impl MapRenderer {
    pub fn new(map: &MapConfig, figure: &FigureConfig, colormap: &str) -> Result<Self> {
        let projection = build_projection(&map.projection)?;
        let bounds = projected_bounds(projection.as_ref(), &map.extent)?;
        debug!(
            projection = projection.name(),
            min_x = bounds.min_x,
            max_x = bounds.max_x,
            min_y = bounds.min_y,
            max_y = bounds.max_y,
            "Projected map extent"
        );

        Ok(Self {
            projection,
            bounds,
            extent: map.extent,
            gridline_step: map.gridline_step,
            colormap: get_colormap(colormap)?,
            figure: figure.clone(),
        })
    }

    /// Draw the complete figure
    pub fn render(
        &self,
        grid: &Grid,
        basemap: &Basemap,
        labels: &MapLabels,
        orientation: ColorbarOrientation,
    ) -> Result<Figure> {
        let start = Instant::now();
        let scale = self.figure.font_scale();
        let (min, max) = grid.value_range().unwrap_or((0.0, 1.0));

        let colorbar = Colorbar {
            orientation,
            colormap: self.colormap.as_ref(),
            min,
            max,
            label: labels.colorbar_label.clone(),
            font_scale: scale,
        };
        let layout = Layout::compute(&self.figure, self.bounds, &colorbar);

        let mut figure = Figure::new(self.figure.width, self.figure.height);

        let panel = log_timed_operation("draw_map_panel", || {
            self.draw_panel(&layout.viewport, grid, basemap, min, max)
        });
        image::imageops::overlay(figure.canvas_mut(), &panel, layout.panel_x, layout.panel_y);

        let canvas = figure.canvas_mut();
        stroke_rect(
            canvas,
            layout.panel_x,
            layout.panel_y,
            layout.viewport.width(),
            layout.viewport.height(),
            scale.max(1),
            LINE,
        );

        self.draw_longitude_labels(canvas, &layout, scale);

        draw_text_centered(
            canvas,
            layout.panel_x + (layout.viewport.width() / 2) as i64,
            layout.title_y,
            &labels.title,
            layout.title_scale,
            TEXT,
        );

        let (bx, by, bw, bh) = layout.colorbar;
        colorbar.draw(canvas, bx, by, bw, bh);

        figure.crop_to_content(self.figure.crop_padding);
        debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            "Map figure rendered"
        );
        Ok(figure)
    }

    fn project_to_pixel(&self, viewport: &Viewport, lon: f64, lat: f64) -> (f32, f32) {
        let (x, y) = self.projection.project(lon, lat);
        viewport.to_pixel(x, y)
    }

    fn project_ring(&self, viewport: &Viewport, ring: &[(f64, f64)]) -> Vec<(f32, f32)> {
        ring.iter()
            .map(|&(lon, lat)| self.project_to_pixel(viewport, lon, lat))
            .collect()
    }

    fn draw_panel(
        &self,
        viewport: &Viewport,
        grid: &Grid,
        basemap: &Basemap,
        min: f64,
        max: f64,
    ) -> RgbaImage {
        let scale = self.figure.font_scale() as f32;
        let mut panel = RgbaImage::from_pixel(viewport.width(), viewport.height(), OCEAN);

        for polygon in &basemap.land.polygons {
            fill_polygon(&mut panel, &self.project_ring(viewport, &polygon.exterior), LAND);
            for hole in &polygon.holes {
                fill_polygon(&mut panel, &self.project_ring(viewport, hole), OCEAN);
            }
        }

        self.draw_mesh(&mut panel, viewport, grid, min, max);

        let coastline = Stroke::solid(with_alpha(LINE, COASTLINE_ALPHA), scale);
        for ring in basemap.coastlines.outlines() {
            draw_polyline(&mut panel, &self.project_ring(viewport, ring), &coastline);
        }

        let border = Stroke::dashed(LINE, scale, scale, 2.0 * scale);
        for ring in basemap.borders.outlines() {
            draw_polyline(&mut panel, &self.project_ring(viewport, ring), &border);
        }

        let gridline = Stroke::dashed(
            with_alpha(GRIDLINE, GRIDLINE_ALPHA),
            2.0 * scale,
            8.0 * scale,
            4.0 * scale,
        );
        for line in self.meridians(viewport).into_iter().chain(self.parallels(viewport)) {
            draw_polyline(&mut panel, &line.1, &gridline);
        }

        panel
    }

    /// Fill every finite cell as a projected quadrilateral
    fn draw_mesh(&self, panel: &mut RgbaImage, viewport: &Viewport, grid: &Grid, min: f64, max: f64) {
        let lat_edges = cell_edges(&grid.lats);
        let lon_edges = cell_edges(&grid.lons);
        let corners = Array2::from_shape_fn(lat_edges.dim(), |idx| {
            self.project_to_pixel(viewport, lon_edges[idx], lat_edges[idx])
        });

        let (rows, cols) = grid.shape();
        let mut drawn = 0usize;
        let mut skipped = 0usize;
        let mut in_extent = 0usize;
        for i in 0..rows {
            for j in 0..cols {
                let value = grid.values[[i, j]];
                if !value.is_finite() {
                    continue;
                }
                let quad = [
                    corners[[i, j]],
                    corners[[i, j + 1]],
                    corners[[i + 1, j + 1]],
                    corners[[i + 1, j]],
                ];
                if quad.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
                    skipped += 1;
                    continue;
                }
                let color = Rgba(self.colormap.map(value, min, max));
                fill_polygon(panel, &quad, color);
                drawn += 1;
                if self.extent.contains(grid.lons[[i, j]], grid.lats[[i, j]]) {
                    in_extent += 1;
                }
            }
        }

        debug!(
            cells = rows * cols,
            drawn = drawn,
            skipped = skipped,
            in_extent = in_extent,
            "Drew data mesh"
        );
    }

    /// Geographic range covering the whole panel, widened to whole grid steps
    fn gridline_range(&self) -> (f64, f64, f64, f64) {
        let step = self.gridline_step;
        let mut min_lon = self.extent.min_lon;
        let mut max_lon = self.extent.max_lon;
        let mut min_lat = self.extent.min_lat;
        let mut max_lat = self.extent.max_lat;

        let b = &self.bounds;
        for t in 0..=20 {
            let f = t as f64 / 20.0;
            for (x, y) in [
                (b.min_x + f * b.width(), b.min_y),
                (b.min_x + f * b.width(), b.max_y),
                (b.min_x, b.min_y + f * b.height()),
                (b.max_x, b.min_y + f * b.height()),
            ] {
                let (lon, lat) = self.projection.unproject(x, y);
                if lon.is_finite() && lat.is_finite() {
                    min_lon = min_lon.min(lon);
                    max_lon = max_lon.max(lon);
                    min_lat = min_lat.min(lat);
                    max_lat = max_lat.max(lat);
                }
            }
        }

        (
            (min_lon / step).floor() * step,
            (max_lon / step).ceil() * step,
            ((min_lat / step).floor() * step).max(-90.0),
            ((max_lat / step).ceil() * step).min(90.0),
        )
    }

    /// Meridians as `(longitude, pixel polyline)`
    fn meridians(&self, viewport: &Viewport) -> Vec<(f64, Vec<(f32, f32)>)> {
        let (min_lon, max_lon, min_lat, max_lat) = self.gridline_range();
        grid_values(min_lon, max_lon, self.gridline_step)
            .map(|lon| {
                let line = (0..=GRIDLINE_SAMPLES)
                    .map(|k| {
                        let lat = min_lat + (max_lat - min_lat) * k as f64 / GRIDLINE_SAMPLES as f64;
                        self.project_to_pixel(viewport, lon, lat)
                    })
                    .collect();
                (lon, line)
            })
            .collect()
    }

    /// Parallels as `(latitude, pixel polyline)`
    fn parallels(&self, viewport: &Viewport) -> Vec<(f64, Vec<(f32, f32)>)> {
        let (min_lon, max_lon, min_lat, max_lat) = self.gridline_range();
        grid_values(min_lat, max_lat, self.gridline_step)
            .map(|lat| {
                let line = (0..=GRIDLINE_SAMPLES)
                    .map(|k| {
                        let lon = min_lon + (max_lon - min_lon) * k as f64 / GRIDLINE_SAMPLES as f64;
                        self.project_to_pixel(viewport, lon, lat)
                    })
                    .collect();
                (lat, line)
            })
            .collect()
    }

    /// Longitude labels where the meridians cross the bottom of the panel
    fn draw_longitude_labels(&self, canvas: &mut RgbaImage, layout: &Layout, scale: u32) {
        let viewport = &layout.viewport;
        let bottom = viewport.height() as f32;
        for (lon, line) in self.meridians(viewport) {
            let Some(x) = crossing_x(&line, bottom) else {
                continue;
            };
            if x < 0.0 || x > viewport.width() as f32 {
                continue;
            }
            draw_text_centered(
                canvas,
                layout.panel_x + x.round() as i64,
                layout.panel_y + viewport.height() as i64 + (3 * scale) as i64,
                &format_longitude(lon, self.gridline_step),
                scale,
                TEXT,
            );
        }
    }
}

/// Where the figure's parts go
struct Layout {
    viewport: Viewport,
    panel_x: i64,
    panel_y: i64,
    title_y: i64,
    title_scale: u32,
    /// Gradient rectangle `(x, y, w, h)`
    colorbar: (i64, i64, u32, u32),
}

impl Layout {
    fn compute(figure: &FigureConfig, bounds: ProjectedBounds, colorbar: &Colorbar<'_>) -> Self {
        let scale = figure.font_scale();
        let title_scale = 2 * scale;
        let margin = 10 * scale;
        let gap = 8 * scale;
        let thickness = (figure.width / 50).max(4);
        let decoration = colorbar.decoration_size();
        let lon_labels = text_height(scale) + 6 * scale;

        let title_y = margin as i64;
        let top = margin + text_height(title_scale) + margin;

        let (avail_w, avail_h) = match colorbar.orientation {
            ColorbarOrientation::Vertical => (
                figure
                    .width
                    .saturating_sub(2 * margin + gap + thickness + decoration),
                figure.height.saturating_sub(top + lon_labels + margin),
            ),
            ColorbarOrientation::Horizontal => (
                figure.width.saturating_sub(2 * margin),
                figure
                    .height
                    .saturating_sub(top + lon_labels + gap + thickness + decoration + margin),
            ),
        };

        let viewport = Viewport::fit(bounds, avail_w.max(1), avail_h.max(1));
        let panel_x = (margin + (avail_w.saturating_sub(viewport.width())) / 2) as i64;
        let panel_y = top as i64;

        let colorbar = match colorbar.orientation {
            ColorbarOrientation::Vertical => {
                let h = (viewport.height() as f64 * COLORBAR_SHRINK) as u32;
                (
                    panel_x + (viewport.width() + gap) as i64,
                    panel_y + ((viewport.height() - h) / 2) as i64,
                    thickness,
                    h,
                )
            }
            ColorbarOrientation::Horizontal => {
                let w = (viewport.width() as f64 * COLORBAR_SHRINK) as u32;
                (
                    panel_x + ((viewport.width() - w) / 2) as i64,
                    panel_y + (viewport.height() + lon_labels + gap) as i64,
                    w,
                    thickness,
                )
            }
        };

        Self {
            viewport,
            panel_x,
            panel_y,
            title_y,
            title_scale,
            colorbar,
        }
    }
}

/// Multiples of `step` in `[min, max]`
fn grid_values(min: f64, max: f64, step: f64) -> impl Iterator<Item = f64> {
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last).map(move |k| k as f64 * step)
}

/// x where a polyline first crosses the horizontal line `y`
fn crossing_x(line: &[(f32, f32)], y: f32) -> Option<f32> {
    line.windows(2).find_map(|pair| {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        if (y0 - y) * (y1 - y) > 0.0 || y0 == y1 {
            return None;
        }
        Some(x0 + (x1 - x0) * (y - y0) / (y1 - y0))
    })
}

/// Longitude label such as `27°E`
pub fn format_longitude(lon: f64, step: f64) -> String {
    let decimals = if step.fract() == 0.0 {
        0
    } else {
        (-step.log10().floor()).max(1.0) as usize
    };
    let wrapped = ((lon + 180.0).rem_euclid(360.0)) - 180.0;
    let text = format!("{:.*}", decimals, wrapped.abs());
    if wrapped.abs() < 1e-9 || (wrapped.abs() - 180.0).abs() < 1e-9 {
        format!("{}\u{00b0}", text)
    } else if wrapped > 0.0 {
        format!("{}\u{00b0}E", text)
    } else {
        format!("{}\u{00b0}W", text)
    }
}

/// Cell boundaries along one axis: midpoints between neighbouring centres,
/// extrapolated half a spacing past the ends. A single centre spans one unit.
fn edges_1d(centers: ArrayView1<f64>) -> Array1<f64> {
    let n = centers.len();
    match n {
        0 => Array1::zeros(0),
        1 => Array1::from(vec![centers[0] - 0.5, centers[0] + 0.5]),
        _ => Array1::from_shape_fn(n + 1, |k| {
            if k == 0 {
                centers[0] - (centers[1] - centers[0]) / 2.0
            } else if k == n {
                centers[n - 1] + (centers[n - 1] - centers[n - 2]) / 2.0
            } else {
                (centers[k - 1] + centers[k]) / 2.0
            }
        }),
    }
}

/// Corner coordinates of every cell of a `(rows, cols)` lattice of centres,
/// as a `(rows + 1, cols + 1)` lattice.
pub fn cell_edges(centers: &Array2<f64>) -> Array2<f64> {
    let (rows, cols) = centers.dim();
    let mut across = Array2::<f64>::zeros((rows, cols + 1));
    for (i, row) in centers.outer_iter().enumerate() {
        across.row_mut(i).assign(&edges_1d(row));
    }

    let mut edges = Array2::<f64>::zeros((rows + 1, cols + 1));
    for (j, column) in across.columns().into_iter().enumerate() {
        edges.column_mut(j).assign(&edges_1d(column));
    }
    edges
}
