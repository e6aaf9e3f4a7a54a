//! CSV table loading.
//!
//! Reads a preprocessed grid table in one pass and pulls out the measurement
//! column, the cell coordinates and the grid extents.

use csv::StringRecord;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, VegplotError};
use crate::logging::log_grid_load_stats;

/// Latitude column name
pub const LAT_COLUMN: &str = "LAT";
/// Longitude column name
pub const LON_COLUMN: &str = "LONG";
/// Grid column index (1-based)
pub const X_COLUMN: &str = "X";
/// Grid row index (1-based)
pub const Y_COLUMN: &str = "Y";

/// Columns extracted from a grid table
#[derive(Debug, Clone, PartialEq)]
pub struct GridTable {
    /// Name of the measurement column
    pub column: String,
    /// Measurement values, in file order
    pub values: Vec<f64>,
    /// Cell latitudes, in file order
    pub lats: Vec<f64>,
    /// Cell longitudes, in file order
    pub lons: Vec<f64>,
    /// Number of grid rows, `max(Y)`
    pub lat_size: usize,
    /// Number of grid columns, `max(X)`
    pub lon_size: usize,
}

impl GridTable {
    /// Number of rows read from the file
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Positions of the required columns in the header
struct ColumnIndices {
    value: usize,
    lat: usize,
    lon: usize,
    x: usize,
    y: usize,
}

impl ColumnIndices {
    fn resolve(headers: &StringRecord, column: &str, path: &Path) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| VegplotError::MissingColumn {
                    column: name.to_string(),
                    path: path.display().to_string(),
                })
        };

        Ok(Self {
            value: find(column)?,
            lat: find(LAT_COLUMN)?,
            lon: find(LON_COLUMN)?,
            x: find(X_COLUMN)?,
            y: find(Y_COLUMN)?,
        })
    }
}

/// Load a grid table, extracting `column` together with the coordinate columns.
pub fn load_table(path: &Path, column: &str) -> Result<GridTable> {
    if !path.exists() {
        return Err(VegplotError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let indices = ColumnIndices::resolve(&headers, column, path)?;
    debug!(headers = ?headers, "Resolved table columns");

    let mut values = Vec::new();
    let mut lats = Vec::new();
    let mut lons = Vec::new();
    let mut max_x = 0usize;
    let mut max_y = 0usize;

    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        // Row numbers in messages count the header as row 1
        let row = row_idx + 2;

        values.push(parse_float(&record, indices.value, column, row)?);
        lats.push(parse_float(&record, indices.lat, LAT_COLUMN, row)?);
        lons.push(parse_float(&record, indices.lon, LON_COLUMN, row)?);
        max_x = max_x.max(parse_index(&record, indices.x, X_COLUMN, row)?);
        max_y = max_y.max(parse_index(&record, indices.y, Y_COLUMN, row)?);
    }

    if values.is_empty() {
        return Err(VegplotError::EmptyTable {
            path: path.display().to_string(),
        });
    }

    let nan_count = values.iter().filter(|v| v.is_nan()).count();
    log_grid_load_stats(
        &path.display().to_string(),
        column,
        values.len(),
        max_y,
        max_x,
        nan_count,
    );

    Ok(GridTable {
        column: column.to_string(),
        values,
        lats,
        lons,
        lat_size: max_y,
        lon_size: max_x,
    })
}

/// Parse a numeric cell; empty cells read as NaN.
fn parse_float(record: &StringRecord, idx: usize, column: &str, row: usize) -> Result<f64> {
    let raw = record.get(idx).unwrap_or("");
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| VegplotError::InvalidValue {
        column: column.to_string(),
        row,
        value: raw.to_string(),
    })
}

/// Parse a 1-based grid index. Integral floats such as `3.0` are accepted.
fn parse_index(record: &StringRecord, idx: usize, column: &str, row: usize) -> Result<usize> {
    let raw = record.get(idx).unwrap_or("");
    let invalid = || VegplotError::InvalidValue {
        column: column.to_string(),
        row,
        value: raw.to_string(),
    };

    if let Ok(value) = raw.parse::<usize>() {
        return Ok(value);
    }

    let value = raw.parse::<f64>().map_err(|_| invalid())?;
    if value.fract() != 0.0 || value < 0.0 || !value.is_finite() {
        return Err(invalid());
    }
    Ok(value as usize)
}
