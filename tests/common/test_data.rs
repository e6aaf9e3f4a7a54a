//! Test data generation utilities.
//!
//! This module provides functions to write grid tables and GeoJSON basemap
//! layers with known patterns for the end-to-end tests.

#![allow(dead_code)]

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

/// South-west corner of the generated grids, inside the default map extent
pub const ORIGIN_LAT: f64 = 39.4;
pub const ORIGIN_LON: f64 = 26.1;
/// Spacing of the generated grids in degrees
pub const SPACING: f64 = 0.25;

/// Shape and content of a generated table
#[derive(Debug, Clone)]
pub struct GridSpec {
    /// Number of grid rows, `max(Y)`
    pub rows: usize,
    /// Number of grid columns, `max(X)`
    pub cols: usize,
    /// Measurement columns to write, e.g. `["LAI20", "LAI21"]`
    pub columns: Vec<String>,
    /// Rows of the table to leave out, counted from 0 in file order
    pub dropped_rows: Vec<usize>,
    /// Cells, as `(row, col)`, written as empty strings
    pub missing_cells: Vec<(usize, usize)>,
}

impl GridSpec {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            columns: vec!["LAI20".to_string()],
            dropped_rows: Vec::new(),
            missing_cells: Vec::new(),
        }
    }

    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn dropping_row(mut self, row: usize) -> Self {
        self.dropped_rows.push(row);
        self
    }

    pub fn with_missing_cell(mut self, row: usize, col: usize) -> Self {
        self.missing_cells.push((row, col));
        self
    }
}

/// Value written for a cell: a smooth gradient in 0..6 like a leaf area index
pub fn gradient_value(row: usize, col: usize, spec: &GridSpec, column_index: usize) -> f64 {
    let fx = col as f64 / spec.cols.max(2).saturating_sub(1) as f64;
    let fy = row as f64 / spec.rows.max(2).saturating_sub(1) as f64;
    (fx + fy) * 3.0 + column_index as f64 * 0.1
}

/// Latitude of grid row `row` (0-based)
pub fn cell_lat(row: usize) -> f64 {
    ORIGIN_LAT + row as f64 * SPACING
}

/// Longitude of grid column `col` (0-based)
pub fn cell_lon(col: usize) -> f64 {
    ORIGIN_LON + col as f64 * SPACING
}

/// Write a grid table in row-major order with 1-based `X`/`Y` indices.
pub fn create_grid_csv(path: &Path, spec: &GridSpec) -> io::Result<()> {
    let mut csv = String::from("X,Y,LAT,LONG");
    for column in &spec.columns {
        csv.push(',');
        csv.push_str(column);
    }
    csv.push('\n');

    let mut index = 0;
    for row in 0..spec.rows {
        for col in 0..spec.cols {
            let skip = spec.dropped_rows.contains(&index);
            index += 1;
            if skip {
                continue;
            }

            let _ = write!(csv, "{},{},{},{}", col + 1, row + 1, cell_lat(row), cell_lon(col));
            for (k, _) in spec.columns.iter().enumerate() {
                if spec.missing_cells.contains(&(row, col)) {
                    csv.push(',');
                } else {
                    let _ = write!(csv, ",{}", gradient_value(row, col, spec, k));
                }
            }
            csv.push('\n');
        }
    }

    std::fs::write(path, csv)
}

/// Write a grid table named `grid.csv` into `dir`
pub fn write_grid_csv(dir: &Path, spec: &GridSpec) -> io::Result<PathBuf> {
    let path = dir.join("grid.csv");
    create_grid_csv(&path, spec)?;
    Ok(path)
}

/// Overwrite one cell of a written table. `data_row` counts data rows from 0.
pub fn set_csv_field(path: &Path, data_row: usize, column: &str, value: &str) -> io::Result<()> {
    let content = std::fs::read_to_string(path)?;
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    let field = lines
        .first()
        .and_then(|header| header.split(',').position(|h| h == column))
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("No column {}", column)))?;

    let line = lines
        .get_mut(data_row + 1)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("No row {}", data_row)))?;
    let mut cells: Vec<&str> = line.split(',').collect();
    if field >= cells.len() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "Short row"));
    }
    cells[field] = value;
    let edited = cells.join(",");
    *line = edited;

    std::fs::write(path, lines.join("\n") + "\n")
}

/// A coastline crossing the default extent from west to east
pub fn create_coastline_geojson(path: &Path) -> io::Result<()> {
    std::fs::write(
        path,
        r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": { "name": "test coast" },
      "geometry": {
        "type": "LineString",
        "coordinates": [[25.0, 40.9], [26.5, 40.7], [28.0, 41.0], [29.5, 40.8], [31.0, 41.1]]
      }
    }
  ]
}"#,
    )
}

/// A border running north to south through the default extent
pub fn create_border_geojson(path: &Path) -> io::Result<()> {
    std::fs::write(
        path,
        r#"{
  "type": "MultiLineString",
  "coordinates": [[[27.3, 43.0], [27.1, 41.5], [27.4, 39.0]]]
}"#,
    )
}

/// Land covering the northern half of the default extent, with a lake
pub fn create_land_geojson(path: &Path) -> io::Result<()> {
    std::fs::write(
        path,
        r#"{
  "type": "Feature",
  "properties": {},
  "geometry": {
    "type": "Polygon",
    "coordinates": [
      [[24.0, 40.7], [32.0, 40.7], [32.0, 43.0], [24.0, 43.0], [24.0, 40.7]],
      [[28.0, 41.3], [28.6, 41.3], [28.6, 41.7], [28.0, 41.7], [28.0, 41.3]]
    ]
  }
}"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_csv_row_count() {
        let dir = tempfile::tempdir().unwrap();
        let spec = GridSpec::new(3, 4).dropping_row(5);
        let path = write_grid_csv(dir.path(), &spec).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        // Header plus 11 data rows
        assert_eq!(content.lines().count(), 12);
        assert!(content.starts_with("X,Y,LAT,LONG,LAI20\n1,1,"));
    }
}
