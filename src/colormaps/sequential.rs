//! Sequential colormaps (single-hue progression).
//!
//! These colormaps are suitable for data that progresses from low to high.

use super::colormap::{lerp_color, Colormap};

/// Winter colormap - blue to spring green
pub struct Winter;

impl Colormap for Winter {
    fn map_normalized(&self, value: f64) -> [u8; 4] {
        let rgb = lerp_color([0, 0, 255], [0, 255, 128], value.clamp(0.0, 1.0));
        [rgb[0], rgb[1], rgb[2], 255]
    }

    fn name(&self) -> &str {
        "winter"
    }
}

/// A colormap backed by a `colorgrad` preset gradient
pub struct GradientColormap {
    name: &'static str,
    gradient: colorgrad::Gradient,
}

impl GradientColormap {
    pub fn new(name: &'static str, gradient: colorgrad::Gradient) -> Self {
        Self { name, gradient }
    }
}

impl Colormap for GradientColormap {
    fn map_normalized(&self, value: f64) -> [u8; 4] {
        let mut rgba = self.gradient.at(value.clamp(0.0, 1.0)).to_rgba8();
        rgba[3] = 255;
        rgba
    }

    fn name(&self) -> &str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winter_ends() {
        assert_eq!(Winter.map_normalized(0.0), [0, 0, 255, 255]);
        assert_eq!(Winter.map_normalized(1.0), [0, 255, 128, 255]);

        let mid = Winter.map_normalized(0.5);
        assert_eq!(mid[0], 0);
        assert!(mid[1] > 120 && mid[1] < 135);
        assert!(mid[2] > 185 && mid[2] < 195);
    }

    #[test]
    fn test_gradient_colormap_is_opaque_and_monotone() {
        let greens = GradientColormap::new("greens", colorgrad::greens());
        assert_eq!(greens.name(), "greens");

        // Greens darkens from low to high
        let brightness = |c: [u8; 4]| c[0] as u32 + c[1] as u32 + c[2] as u32;
        let low = greens.map_normalized(0.0);
        let high = greens.map_normalized(1.0);
        assert_eq!(low[3], 255);
        assert_eq!(high[3], 255);
        assert!(brightness(low) > brightness(high));
    }

    #[test]
    fn test_viridis_ends() {
        let viridis = GradientColormap::new("viridis", colorgrad::viridis());
        let low = viridis.map_normalized(0.0);
        let high = viridis.map_normalized(1.0);
        // Dark purple to yellow
        assert!(low[2] > low[1]);
        assert!(high[0] > 200 && high[1] > 200);
    }
}
