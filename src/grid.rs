//! Reshaping table columns into 2-D lattices.

use ndarray::{Array2, ArrayView2};

use crate::error::{Result, VegplotError};
use crate::table::GridTable;

/// Reshape a column into a `(lat_size, lon_size)` array, row-major.
pub fn reshape(column: &[f64], lat_size: usize, lon_size: usize) -> Result<Array2<f64>> {
    if lat_size.checked_mul(lon_size) != Some(column.len()) {
        return Err(VegplotError::ShapeMismatch {
            len: column.len(),
            lat_size,
            lon_size,
        });
    }

    Array2::from_shape_vec((lat_size, lon_size), column.to_vec()).map_err(|_| {
        VegplotError::ShapeMismatch {
            len: column.len(),
            lat_size,
            lon_size,
        }
    })
}

/// Flatten a lattice back into row-major order.
pub fn flatten(array: &ArrayView2<f64>) -> Vec<f64> {
    array.iter().copied().collect()
}

/// Measurement values with their cell coordinates, all of the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub values: Array2<f64>,
    pub lats: Array2<f64>,
    pub lons: Array2<f64>,
}

impl Grid {
    /// Reshape the three columns of a table.
    pub fn from_table(table: &GridTable) -> Result<Self> {
        Ok(Self {
            values: reshape(&table.values, table.lat_size, table.lon_size)?,
            lats: reshape(&table.lats, table.lat_size, table.lon_size)?,
            lons: reshape(&table.lons, table.lat_size, table.lon_size)?,
        })
    }

    /// `(rows, cols)` of the lattice
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Finite min/max of the values, or `None` when nothing is finite
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in self.values.iter().filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
        }
        if min <= max {
            Some((min, max))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_reshape_row_major() {
        let column = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let grid = reshape(&column, 2, 3).unwrap();
        assert_eq!(grid, array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    }

    #[test]
    fn test_reshape_flatten_round_trip() {
        for (rows, cols) in [(1, 1), (1, 7), (7, 1), (4, 5), (13, 11)] {
            let column: Vec<f64> = (0..rows * cols).map(|i| i as f64 * 0.25).collect();
            let grid = reshape(&column, rows, cols).unwrap();
            assert_eq!(flatten(&grid.view()), column);
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let column: Vec<f64> = (0..99).map(|i| i as f64).collect();
        match reshape(&column, 10, 10).unwrap_err() {
            VegplotError::ShapeMismatch {
                len,
                lat_size,
                lon_size,
            } => {
                assert_eq!(len, 99);
                assert_eq!(lat_size, 10);
                assert_eq!(lon_size, 10);
            }
            other => panic!("Expected ShapeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_shape_mismatch_with_overflowing_extents() {
        let column = [1.0, 2.0];
        let err = reshape(&column, 2, usize::MAX).unwrap_err();
        assert!(matches!(
            err,
            VegplotError::ShapeMismatch { len: 2, lat_size: 2, lon_size: usize::MAX }
        ));
        assert!(err.to_string().starts_with("Shape mismatch"));
    }

    #[test]
    fn test_grid_from_table() {
        let table = GridTable {
            column: "LAI01".to_string(),
            values: vec![0.1, 0.2, f64::NAN, 0.4],
            lats: vec![40.0, 40.0, 40.5, 40.5],
            lons: vec![26.0, 26.5, 26.0, 26.5],
            lat_size: 2,
            lon_size: 2,
        };

        let grid = Grid::from_table(&table).unwrap();
        assert_eq!(grid.shape(), (2, 2));
        assert_eq!(grid.lats[[1, 0]], 40.5);
        assert_eq!(grid.lons[[0, 1]], 26.5);
        assert_eq!(grid.value_range(), Some((0.1, 0.4)));
    }

    #[test]
    fn test_value_range_all_nan() {
        let grid = Grid {
            values: array![[f64::NAN]],
            lats: array![[0.0]],
            lons: array![[0.0]],
        };
        assert_eq!(grid.value_range(), None);
    }
}
