//! Image inspection utilities for testing.
//!
//! This module provides helper functions for checking the PNG files the
//! plotter writes.

#![allow(dead_code)]

use image::{DynamicImage, ImageError, ImageFormat, Rgba, RgbaImage};
use std::path::Path;

/// Load an image from a file
pub fn load_image(path: &Path) -> Result<DynamicImage, ImageError> {
    image::open(path)
}

/// Detect image format from bytes
pub fn detect_image_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Check the format of an encoded image
pub fn assert_image_format(bytes: &[u8], expected_format: ImageFormat) -> Result<(), String> {
    let actual_format =
        detect_image_format(bytes).ok_or_else(|| "Could not detect image format".to_string())?;

    if actual_format != expected_format {
        return Err(format!(
            "Image format differs: actual = {:?}, expected = {:?}",
            actual_format, expected_format
        ));
    }

    Ok(())
}

/// Number of pixels with exactly `color`
pub fn count_color(image: &RgbaImage, color: Rgba<u8>) -> usize {
    image.pixels().filter(|p| **p == color).count()
}

/// Number of distinct colors in the image
pub fn distinct_colors(image: &RgbaImage) -> usize {
    let mut colors: Vec<[u8; 4]> = image.pixels().map(|p| p.0).collect();
    colors.sort_unstable();
    colors.dedup();
    colors.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_image_format() {
        let img = RgbaImage::new(2, 2);
        let mut png_bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
            .unwrap();

        assert_eq!(detect_image_format(&png_bytes), Some(ImageFormat::Png));
        assert!(assert_image_format(&png_bytes, ImageFormat::Png).is_ok());
        assert!(assert_image_format(&png_bytes, ImageFormat::Jpeg).is_err());
    }

    #[test]
    fn test_color_counts() {
        let mut img = RgbaImage::from_pixel(3, 3, Rgba([255, 255, 255, 255]));
        img.put_pixel(1, 1, Rgba([1, 2, 3, 255]));
        assert_eq!(count_color(&img, Rgba([1, 2, 3, 255])), 1);
        assert_eq!(distinct_colors(&img), 2);
    }
}
