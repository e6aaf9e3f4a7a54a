//! Map projections.
//!
//! The study region is drawn in a Lambert Conformal Conic projection. The
//! projection maps a cone secant to the sphere at two standard parallels onto
//! a plane; coordinates are meters, shifted by the false easting/northing.
//!
//! Parameters:
//! - Central latitude (lat0): latitude of the projection origin
//! - Central longitude (lon0): the central meridian
//! - Standard parallels: latin1 and latin2 (equal for a tangent cone)

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::config::{Extent, ProjectionConfig};
use crate::error::{Result, VegplotError};

/// A forward/inverse mapping between lon/lat degrees and plane coordinates.
pub trait Projection {
    /// Project lon/lat (degrees) onto the plane.
    fn project(&self, lon: f64, lat: f64) -> (f64, f64);

    /// Invert plane coordinates back to lon/lat (degrees).
    fn unproject(&self, x: f64, y: f64) -> (f64, f64);

    fn name(&self) -> &str;
}

/// Build the projection described by the configuration
pub fn build_projection(config: &ProjectionConfig) -> Result<Box<dyn Projection>> {
    match config {
        ProjectionConfig::LambertConformal {
            central_latitude,
            central_longitude,
            standard_parallels,
            false_easting,
            false_northing,
            earth_radius,
        } => Ok(Box::new(LambertConformal::new(
            *central_latitude,
            *central_longitude,
            *standard_parallels,
            *false_easting,
            *false_northing,
            *earth_radius,
        )?)),
        ProjectionConfig::PlateCarree => Ok(Box::new(PlateCarree)),
    }
}

/// Lambert Conformal Conic projection on a sphere.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian in radians
    lon0: f64,
    false_easting: f64,
    false_northing: f64,
    earth_radius: f64,
    /// Cone constant
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the central latitude
    rho0: f64,
}

impl LambertConformal {
    /// Create a projection. Angles are in degrees, offsets and radius in meters.
    pub fn new(
        central_latitude: f64,
        central_longitude: f64,
        standard_parallels: [f64; 2],
        false_easting: f64,
        false_northing: f64,
        earth_radius: f64,
    ) -> Result<Self> {
        let lat0 = central_latitude.to_radians();
        let lon0 = central_longitude.to_radians();
        let latin1 = standard_parallels[0].to_radians();
        let latin2 = standard_parallels[1].to_radians();

        if standard_parallels.iter().any(|p| p.abs() >= 90.0) {
            return Err(VegplotError::Projection {
                message: format!(
                    "Standard parallels must lie strictly between the poles, got {:?}",
                    standard_parallels
                ),
            });
        }

        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            latin1.sin()
        } else {
            // Secant cone (two standard parallels)
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio = ((FRAC_PI_4 + latin2 / 2.0).tan() / (FRAC_PI_4 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        if !n.is_finite() || n.abs() < 1e-10 {
            return Err(VegplotError::Projection {
                message: format!(
                    "Standard parallels {:?} give a degenerate cone",
                    standard_parallels
                ),
            });
        }

        let f = latin1.cos() * (FRAC_PI_4 + latin1 / 2.0).tan().powf(n) / n;
        let rho0 = earth_radius * f / (FRAC_PI_4 + lat0 / 2.0).tan().powf(n);

        Ok(Self {
            lon0,
            false_easting,
            false_northing,
            earth_radius,
            n,
            f,
            rho0,
        })
    }

    /// Cone constant of the projection
    pub fn cone_constant(&self) -> f64 {
        self.n
    }
}

/// Wrap an angle difference into [-pi, pi). Non-finite input stays non-finite.
fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

impl Projection for LambertConformal {
    fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let lat = lat.to_radians();
        let dlon = wrap_angle(lon.to_radians() - self.lon0);

        let rho = self.earth_radius * self.f / (FRAC_PI_4 + lat / 2.0).tan().powf(self.n);
        let theta = self.n * dlon;

        let x = rho * theta.sin() + self.false_easting;
        let y = self.rho0 - rho * theta.cos() + self.false_northing;
        (x, y)
    }

    fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x - self.false_easting;
        let dy = self.rho0 - (y - self.false_northing);
        let sign = self.n.signum();

        let rho = sign * (dx * dx + dy * dy).sqrt();
        let theta = (sign * dx).atan2(sign * dy);

        let lat = if rho == 0.0 {
            sign * FRAC_PI_2
        } else {
            2.0 * (self.earth_radius * self.f / rho).powf(1.0 / self.n).atan() - FRAC_PI_2
        };
        let lon = self.lon0 + theta / self.n;

        (lon.to_degrees(), lat.to_degrees())
    }

    fn name(&self) -> &str {
        "lambert_conformal"
    }
}

/// Equirectangular lon/lat plane
#[derive(Debug, Clone, Copy)]
pub struct PlateCarree;

impl Projection for PlateCarree {
    fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        (lon, lat)
    }

    fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        (x, y)
    }

    fn name(&self) -> &str {
        "plate_carree"
    }
}

/// Axis-aligned rectangle in projected coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl ProjectedBounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Samples taken along each edge of the extent
const EDGE_SAMPLES: usize = 100;

/// Rectangle enclosing a geographic extent once projected.
///
/// The extent's edges are curved in a conic projection, so each edge is
/// sampled densely rather than projecting the corners only.
pub fn projected_bounds(projection: &dyn Projection, extent: &Extent) -> Result<ProjectedBounds> {
    let mut bounds = ProjectedBounds {
        min_x: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        min_y: f64::INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    for t in 0..=EDGE_SAMPLES {
        let frac = t as f64 / EDGE_SAMPLES as f64;
        let lon = extent.min_lon + frac * (extent.max_lon - extent.min_lon);
        let lat = extent.min_lat + frac * (extent.max_lat - extent.min_lat);

        for (plon, plat) in [
            (lon, extent.min_lat),
            (lon, extent.max_lat),
            (extent.min_lon, lat),
            (extent.max_lon, lat),
        ] {
            let (x, y) = projection.project(plon, plat);
            if x.is_finite() && y.is_finite() {
                bounds.min_x = bounds.min_x.min(x);
                bounds.max_x = bounds.max_x.max(x);
                bounds.min_y = bounds.min_y.min(y);
                bounds.max_y = bounds.max_y.max(y);
            }
        }
    }

    if !(bounds.width() > 0.0 && bounds.height() > 0.0) {
        return Err(VegplotError::Projection {
            message: format!(
                "Extent {:?} does not project to a finite area in {}",
                extent,
                projection.name()
            ),
        });
    }

    Ok(bounds)
}
