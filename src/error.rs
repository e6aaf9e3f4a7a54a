//! Error types for vegplot.
//!
//! Every precondition the plotting pipeline checks has its own variant, so a
//! failed run names exactly which input was rejected.

use thiserror::Error;

/// The main error type for vegplot operations.
#[derive(Error, Debug)]
pub enum VegplotError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A required column is absent from the table header
    #[error("Missing column: '{column}' not found in {path}")]
    MissingColumn { column: String, path: String },

    /// A cell could not be read as a number
    #[error("Invalid value in column '{column}' at row {row}: '{value}'")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    /// The table has a header but no data rows
    #[error("Table has no data rows: {path}")]
    EmptyTable { path: String },

    /// Row count does not match the grid extents
    #[error("Shape mismatch: {len} values cannot be reshaped to ({lat_size}, {lon_size})")]
    ShapeMismatch {
        len: usize,
        lat_size: usize,
        lon_size: usize,
    },

    /// The column name does not end in a two-digit period index
    #[error("Invalid period suffix '{suffix}' in column name '{column}'")]
    InvalidPeriodSuffix { column: String, suffix: String },

    /// Day-of-year outside the given year
    #[error("Day of year {day} is out of range for year {year} (expected 1..={max})")]
    DayOfYearOutOfRange { year: i32, day: i64, max: u32 },

    /// Year that cannot be encoded in a Julian code
    #[error("Invalid year {year}: expected a four-digit year")]
    InvalidYear { year: i32 },

    /// Calendar date could not be constructed
    #[error("Date out of range: {message}")]
    DateOutOfRange { message: String },

    /// Unrecognized color bar orientation
    #[error("Invalid colorbar orientation '{value}': expected 'v' (vertical) or 'h' (horizontal)")]
    InvalidOrientation { value: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// Projection setup errors
    #[error("Projection error: {message}")]
    Projection { message: String },

    /// Basemap layer errors
    #[error("Basemap error: {message}")]
    Basemap { message: String },

    /// Image generation errors
    #[error("Image generation error: {message}")]
    ImageGeneration { message: String },
}

/// Convenience type alias for Results with VegplotError
pub type Result<T> = std::result::Result<T, VegplotError>;
