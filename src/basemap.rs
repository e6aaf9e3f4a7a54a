//! Basemap layers read from GeoJSON.
//!
//! Coastlines, national borders and land polygons each come from their own
//! GeoJSON file holding bare geometries, features, feature collections or
//! geometry collections. A layer without a configured file falls back to a
//! coarse outline of the Marmara region compiled into the binary.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::{BasemapConfig, Extent};
use crate::error::{Result, VegplotError};

/// A sequence of lon/lat vertices in degrees
pub type Ring = Vec<(f64, f64)>;

/// A polygon as its exterior ring followed by any holes
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRings {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

/// Geometries of one basemap layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoLayer {
    pub lines: Vec<Ring>,
    pub polygons: Vec<PolygonRings>,
}

impl GeoLayer {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.polygons.is_empty()
    }

    /// Every line and every polygon ring, for drawing outlines
    pub fn outlines(&self) -> impl Iterator<Item = &Ring> {
        self.lines.iter().chain(
            self.polygons
                .iter()
                .flat_map(|p| std::iter::once(&p.exterior).chain(p.holes.iter())),
        )
    }

    /// Drop geometries whose bounding box misses `extent`
    pub fn retain_overlapping(&mut self, extent: &Extent) {
        self.lines.retain(|ring| ring_overlaps(ring, extent));
        self.polygons.retain(|p| ring_overlaps(&p.exterior, extent));
    }
}

fn ring_overlaps(ring: &[(f64, f64)], extent: &Extent) -> bool {
    let mut min_lon = f64::INFINITY;
    let mut max_lon = f64::NEG_INFINITY;
    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;
    for &(lon, lat) in ring {
        min_lon = min_lon.min(lon);
        max_lon = max_lon.max(lon);
        min_lat = min_lat.min(lat);
        max_lat = max_lat.max(lat);
    }
    min_lon <= extent.max_lon
        && max_lon >= extent.min_lon
        && min_lat <= extent.max_lat
        && max_lat >= extent.min_lat
}

/// Built-in layers covering 25-31E, 39-42.6N
const BUILTIN_COASTLINES: &str = include_str!("../data/basemap/coastlines.geojson");
const BUILTIN_BORDERS: &str = include_str!("../data/basemap/borders.geojson");
const BUILTIN_LAND: &str = include_str!("../data/basemap/land.geojson");

/// One of the three decoration layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Coastlines,
    Borders,
    Land,
}

impl LayerKind {
    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Coastlines => "coastlines",
            LayerKind::Borders => "borders",
            LayerKind::Land => "land",
        }
    }

    fn builtin_source(self) -> &'static str {
        match self {
            LayerKind::Coastlines => BUILTIN_COASTLINES,
            LayerKind::Borders => BUILTIN_BORDERS,
            LayerKind::Land => BUILTIN_LAND,
        }
    }
}

/// The three decoration layers of a map
#[derive(Debug, Clone, Default)]
pub struct Basemap {
    pub coastlines: GeoLayer,
    pub borders: GeoLayer,
    pub land: GeoLayer,
}

impl Basemap {
    /// Load every configured layer, keeping only geometries near `extent`.
    pub fn load(config: &BasemapConfig, extent: &Extent) -> Result<Self> {
        let layer = |kind, path: &Option<PathBuf>| load_layer(kind, path.as_deref(), config.builtin);
        let mut basemap = Self {
            coastlines: layer(LayerKind::Coastlines, &config.coastlines)?,
            borders: layer(LayerKind::Borders, &config.borders)?,
            land: layer(LayerKind::Land, &config.land)?,
        };
        basemap.coastlines.retain_overlapping(extent);
        basemap.borders.retain_overlapping(extent);
        basemap.land.retain_overlapping(extent);
        Ok(basemap)
    }
}

/// Load one layer from `path`. Without a path the layer is the built-in one,
/// or empty when `builtin` is off.
pub fn load_layer(kind: LayerKind, path: Option<&Path>, builtin: bool) -> Result<GeoLayer> {
    let name = kind.name();
    let Some(path) = path else {
        if builtin {
            return builtin_layer(kind);
        }
        warn!(layer = name, "No GeoJSON source configured, layer left empty");
        return Ok(GeoLayer::default());
    };

    let content = std::fs::read_to_string(path).map_err(|e| VegplotError::Basemap {
        message: format!("Failed to read {} layer {}: {}", name, path.display(), e),
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|e| VegplotError::Basemap {
        message: format!("Failed to parse {} layer {}: {}", name, path.display(), e),
    })?;

    let layer = parse_geojson(&value).map_err(|e| match e {
        VegplotError::Basemap { message } => VegplotError::Basemap {
            message: format!("{} layer {}: {}", name, path.display(), message),
        },
        other => other,
    })?;

    debug!(
        layer = name,
        path = %path.display(),
        lines = layer.lines.len(),
        polygons = layer.polygons.len(),
        "Loaded basemap layer"
    );

    Ok(layer)
}

/// The compiled-in geometries of a layer
pub fn builtin_layer(kind: LayerKind) -> Result<GeoLayer> {
    let value: Value =
        serde_json::from_str(kind.builtin_source()).map_err(|e| VegplotError::Basemap {
            message: format!("Failed to parse built-in {} layer: {}", kind.name(), e),
        })?;
    let layer = parse_geojson(&value)?;
    debug!(
        layer = kind.name(),
        lines = layer.lines.len(),
        polygons = layer.polygons.len(),
        "Using built-in basemap layer"
    );
    Ok(layer)
}

/// Collect the line and polygon geometries of a GeoJSON document.
pub fn parse_geojson(value: &Value) -> Result<GeoLayer> {
    let mut layer = GeoLayer::default();
    collect(value, &mut layer)?;
    Ok(layer)
}

fn invalid(message: impl Into<String>) -> VegplotError {
    VegplotError::Basemap {
        message: message.into(),
    }
}

fn collect(value: &Value, layer: &mut GeoLayer) -> Result<()> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("GeoJSON object without a \"type\""))?;

    match kind {
        "FeatureCollection" => {
            let features = value
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| invalid("FeatureCollection without \"features\""))?;
            for feature in features {
                collect(feature, layer)?;
            }
        }
        "Feature" => match value.get("geometry") {
            Some(Value::Null) | None => {}
            Some(geometry) => collect(geometry, layer)?,
        },
        "GeometryCollection" => {
            let geometries = value
                .get("geometries")
                .and_then(Value::as_array)
                .ok_or_else(|| invalid("GeometryCollection without \"geometries\""))?;
            for geometry in geometries {
                collect(geometry, layer)?;
            }
        }
        "LineString" => layer.lines.push(ring(coordinates(value)?)?),
        "MultiLineString" => {
            for line in array(coordinates(value)?)? {
                layer.lines.push(ring(line)?);
            }
        }
        "Polygon" => layer.polygons.push(polygon(coordinates(value)?)?),
        "MultiPolygon" => {
            for rings in array(coordinates(value)?)? {
                layer.polygons.push(polygon(rings)?);
            }
        }
        // Points carry nothing to draw
        "Point" | "MultiPoint" => {}
        other => return Err(invalid(format!("Unsupported geometry type \"{}\"", other))),
    }

    Ok(())
}

fn coordinates(value: &Value) -> Result<&Value> {
    value
        .get("coordinates")
        .ok_or_else(|| invalid("Geometry without \"coordinates\""))
}

fn array(value: &Value) -> Result<&Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| invalid("Expected an array of coordinates"))
}

fn position(value: &Value) -> Result<(f64, f64)> {
    let pair = array(value)?;
    match (
        pair.first().and_then(Value::as_f64),
        pair.get(1).and_then(Value::as_f64),
    ) {
        (Some(lon), Some(lat)) => Ok((lon, lat)),
        _ => Err(invalid(format!("Invalid position {}", value))),
    }
}

fn ring(value: &Value) -> Result<Ring> {
    array(value)?.iter().map(position).collect()
}

fn polygon(value: &Value) -> Result<PolygonRings> {
    let mut rings = array(value)?.iter().map(ring);
    let exterior = rings
        .next()
        .ok_or_else(|| invalid("Polygon without an exterior ring"))??;
    let holes = rings.collect::<Result<Vec<_>>>()?;
    Ok(PolygonRings { exterior, holes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn extent() -> Extent {
        Extent {
            min_lon: 25.0,
            max_lon: 31.0,
            min_lat: 39.0,
            max_lat: 43.0,
        }
    }

    #[test]
    fn test_parse_feature_collection() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": {},
                  "geometry": { "type": "LineString", "coordinates": [[26.0, 40.0], [27.0, 41.0]] } },
                { "type": "Feature", "properties": {}, "geometry": null },
                { "type": "Feature", "properties": {},
                  "geometry": { "type": "MultiPolygon", "coordinates": [
                      [[[26.0, 40.0], [27.0, 40.0], [27.0, 41.0], [26.0, 40.0]]],
                      [[[28.0, 40.0], [29.0, 40.0], [29.0, 41.0], [28.0, 40.0]],
                       [[28.2, 40.2], [28.5, 40.2], [28.5, 40.5], [28.2, 40.2]]]
                  ] } }
            ]
        });

        let layer = parse_geojson(&doc).unwrap();
        assert_eq!(layer.lines, vec![vec![(26.0, 40.0), (27.0, 41.0)]]);
        assert_eq!(layer.polygons.len(), 2);
        assert_eq!(layer.polygons[1].holes.len(), 1);
        assert_eq!(layer.outlines().count(), 4);
    }

    #[test]
    fn test_parse_geometry_collection() {
        let doc = json!({
            "type": "GeometryCollection",
            "geometries": [
                { "type": "MultiLineString", "coordinates": [[[0, 0], [1, 1]], [[2, 2], [3, 3]]] },
                { "type": "Point", "coordinates": [5, 5] }
            ]
        });
        let layer = parse_geojson(&doc).unwrap();
        assert_eq!(layer.lines.len(), 2);
        assert!(layer.polygons.is_empty());
    }

    #[test]
    fn test_invalid_geojson() {
        assert!(parse_geojson(&json!({ "coordinates": [] })).is_err());
        assert!(parse_geojson(&json!({ "type": "Circle" })).is_err());
        assert!(parse_geojson(&json!({ "type": "LineString", "coordinates": [[0, "a"]] })).is_err());
        assert!(parse_geojson(&json!({ "type": "Polygon", "coordinates": [] })).is_err());
    }

    #[test]
    fn test_retain_overlapping() {
        let mut layer = GeoLayer {
            lines: vec![
                vec![(26.0, 40.0), (27.0, 40.0)],
                vec![(100.0, 10.0), (101.0, 11.0)],
                // Crosses the extent without a vertex inside it
                vec![(20.0, 41.0), (35.0, 41.0)],
            ],
            polygons: vec![],
        };
        layer.retain_overlapping(&extent());
        assert_eq!(layer.lines.len(), 2);
    }

    #[test]
    fn test_unconfigured_layer_is_empty_without_builtin() {
        let layer = load_layer(LayerKind::Coastlines, None, false).unwrap();
        assert!(layer.is_empty());
    }

    #[test]
    fn test_builtin_layers() {
        let land = load_layer(LayerKind::Land, None, true).unwrap();
        assert_eq!(land, builtin_layer(LayerKind::Land).unwrap());
        assert_eq!(land.polygons.len(), 4);
        assert!(land.polygons.iter().all(|p| p.exterior.first() == p.exterior.last()));

        let coastlines = builtin_layer(LayerKind::Coastlines).unwrap();
        assert_eq!(coastlines.lines.len(), 5);
        let borders = builtin_layer(LayerKind::Borders).unwrap();
        assert_eq!(borders.lines.len(), 3);

        let mut borders = borders;
        borders.retain_overlapping(&crate::config::Config::default().map.extent);
        assert_eq!(borders.lines.len(), 3);
    }

    #[test]
    fn test_unreadable_layer() {
        let result = load_layer(
            LayerKind::Borders,
            Some(Path::new("/nonexistent/borders.geojson")),
            true,
        );
        assert!(matches!(result, Err(VegplotError::Basemap { .. })));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("land.geojson");
        std::fs::write(&path, "{ not json").unwrap();
        match load_layer(LayerKind::Land, Some(&path), true).unwrap_err() {
            VegplotError::Basemap { message } => assert!(message.contains("land")),
            other => panic!("Expected Basemap error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_basemap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coast.geojson");
        std::fs::write(
            &path,
            r#"{ "type": "LineString", "coordinates": [[26.5, 40.0], [27.5, 40.5]] }"#,
        )
        .unwrap();

        let config = BasemapConfig {
            coastlines: Some(path),
            borders: None,
            land: None,
            builtin: false,
        };
        let basemap = Basemap::load(&config, &extent()).unwrap();
        assert_eq!(basemap.coastlines.lines.len(), 1);
        assert!(basemap.borders.is_empty());
        assert!(basemap.land.is_empty());

        // A configured file replaces only its own layer
        let basemap = Basemap::load(&BasemapConfig { builtin: true, ..config }, &extent()).unwrap();
        assert_eq!(basemap.coastlines.lines.len(), 1);
        assert!(!basemap.borders.is_empty());
        assert!(!basemap.land.is_empty());
    }
}
