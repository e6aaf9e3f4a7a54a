//! The figure canvas and its PNG output.

use image::{Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

use crate::error::{Result, VegplotError};

/// Figure background
pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Owns the raster a plot is drawn on. The canvas is released when the
/// figure is dropped, whichever way the plot ends.
pub struct Figure {
    canvas: RgbaImage,
}

impl Figure {
    /// Create a blank figure
    pub fn new(width: u32, height: u32) -> Self {
        debug!(width = width, height = height, "Allocated figure canvas");
        Self {
            canvas: RgbaImage::from_pixel(width, height, BACKGROUND),
        }
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut RgbaImage {
        &mut self.canvas
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    /// Smallest rectangle holding every non-background pixel, as
    /// `(x, y, width, height)`
    pub fn content_bounds(&self) -> Option<(u32, u32, u32, u32)> {
        let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
        let (mut max_x, mut max_y) = (0u32, 0u32);
        let mut found = false;

        for (x, y, pixel) in self.canvas.enumerate_pixels() {
            if *pixel != BACKGROUND {
                found = true;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }

        found.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }

    /// Crop to the content plus `padding` pixels on each side, staying
    /// inside the canvas. A blank figure is left as is.
    pub fn crop_to_content(&mut self, padding: u32) {
        let Some((x, y, w, h)) = self.content_bounds() else {
            return;
        };
        let (width, height) = self.dimensions();

        let x0 = x.saturating_sub(padding);
        let y0 = y.saturating_sub(padding);
        let x1 = (x + w + padding).min(width);
        let y1 = (y + h + padding).min(height);

        self.canvas = image::imageops::crop_imm(&self.canvas, x0, y0, x1 - x0, y1 - y0).to_image();
        debug!(
            from_width = width,
            from_height = height,
            width = x1 - x0,
            height = y1 - y0,
            "Cropped figure to content"
        );
    }

    /// Encode the figure as PNG in memory
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let start = Instant::now();
        let mut buffer = Cursor::new(Vec::new());
        self.canvas
            .write_to(&mut buffer, image::ImageFormat::Png)
            .map_err(|e| VegplotError::ImageGeneration {
                message: format!("Failed to encode PNG: {}", e),
            })?;

        let bytes = buffer.into_inner();
        debug!(
            bytes = bytes.len(),
            encoding_duration_ms = start.elapsed().as_millis() as u64,
            "Image encoded successfully"
        );
        Ok(bytes)
    }

    /// Encode and write the figure to `path` in a single write
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.encode_png()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl Drop for Figure {
    fn drop(&mut self) {
        let (width, height) = self.canvas.dimensions();
        debug!(width = width, height = height, "Released figure canvas");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn test_blank_figure_has_no_content() {
        let mut figure = Figure::new(50, 40);
        assert_eq!(figure.content_bounds(), None);
        figure.crop_to_content(5);
        assert_eq!(figure.dimensions(), (50, 40));
    }

    #[test]
    fn test_crop_to_content() {
        let mut figure = Figure::new(100, 80);
        figure.canvas_mut().put_pixel(30, 20, RED);
        figure.canvas_mut().put_pixel(40, 50, RED);
        assert_eq!(figure.content_bounds(), Some((30, 20, 11, 31)));

        figure.crop_to_content(5);
        assert_eq!(figure.dimensions(), (21, 41));
        assert_eq!(*figure.canvas().get_pixel(5, 5), RED);
    }

    #[test]
    fn test_crop_padding_stays_inside() {
        let mut figure = Figure::new(20, 20);
        figure.canvas_mut().put_pixel(0, 19, RED);
        figure.crop_to_content(10);
        assert_eq!(figure.dimensions(), (11, 11));
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure.png");

        let mut figure = Figure::new(16, 8);
        figure.canvas_mut().put_pixel(3, 3, RED);
        figure.save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (16, 8));
        assert_eq!(*decoded.get_pixel(3, 3), RED);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let figure = Figure::new(4, 4);
        let result = figure.save(Path::new("/nonexistent/dir/figure.png"));
        assert!(matches!(result, Err(VegplotError::Io(_))));
    }
}
