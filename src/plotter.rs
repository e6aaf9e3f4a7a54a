//! The grid plotter: table load, reshape, date derivation and rendering.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, info_span};

use crate::basemap::Basemap;
use crate::calendar;
use crate::config::{Config, PlotRequest};
use crate::error::Result;
use crate::grid::Grid;
use crate::logging::{generate_run_id, log_operation_end, log_operation_start, log_timed_operation};
use crate::render::{ColorbarOrientation, MapLabels, MapRenderer};
use crate::table::{load_table, GridTable};

/// Plots one column of a preprocessed grid table as a map PNG.
#[derive(Debug, Clone)]
pub struct GridPlotter {
    csv_path: PathBuf,
    column: String,
    output_dir: PathBuf,
    year: i32,
    orientation: ColorbarOrientation,
    config: Config,
}

impl GridPlotter {
    /// Create a plotter. The color bar position must be `"v"` or `"h"`
    /// (any case); anything else is rejected here, before any input is read.
    pub fn new(
        csv_path: impl Into<PathBuf>,
        column: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        year: i32,
        colorbar_position: &str,
        config: Config,
    ) -> Result<Self> {
        let orientation = colorbar_position.parse::<ColorbarOrientation>()?;
        Ok(Self {
            csv_path: csv_path.into(),
            column: column.into(),
            output_dir: output_dir.into(),
            year,
            orientation,
            config,
        })
    }

    /// Create a plotter from command-line inputs
    pub fn from_request(request: PlotRequest, config: Config) -> Result<Self> {
        Self::new(
            request.csv_file,
            request.column,
            request.output_dir,
            request.year,
            &request.colorbar,
            config,
        )
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn orientation(&self) -> ColorbarOrientation {
        self.orientation
    }

    /// Load the measurement and coordinate columns
    pub fn read_table(&self) -> Result<GridTable> {
        load_table(&self.csv_path, &self.column)
    }

    /// Reshape the table columns into `(max(Y), max(X))` lattices
    pub fn reshape_arrays(&self, table: &GridTable) -> Result<Grid> {
        Grid::from_table(table)
    }

    /// Calendar date of the composite period named by the column
    pub fn acquisition_date(&self) -> Result<NaiveDate> {
        calendar::acquisition_date(&self.column, self.year, self.config.plot.period_days)
    }

    /// File name of the figure for `date`
    pub fn output_filename(&self, date: NaiveDate) -> String {
        format!(
            "{}_date_{}.png",
            self.config.plot.filename_prefix,
            date.format("%Y-%m-%d")
        )
    }

    pub fn output_path(&self, date: NaiveDate) -> PathBuf {
        self.output_dir.join(self.output_filename(date))
    }

    /// Run the whole pipeline and return the path of the written PNG.
    /// Nothing is written unless every step succeeds.
    pub fn plot(&self) -> Result<PathBuf> {
        let run_id = generate_run_id();
        let span = info_span!("plot", run_id = %run_id, column = %self.column);
        let _guard = span.enter();

        let start = Instant::now();
        let details = self.csv_path.display().to_string();
        log_operation_start("plot", Some(&details));

        let result = self.run();
        log_operation_end("plot", start, result.is_ok());
        result
    }

    fn run(&self) -> Result<PathBuf> {
        let table = self.read_table()?;
        let grid = log_timed_operation("reshape", || self.reshape_arrays(&table))?;
        let date = self.acquisition_date()?;
        debug!(year = self.year, date = %date, "Derived acquisition date");

        let map = &self.config.map;
        let basemap = Basemap::load(&map.basemap, &map.extent)?;
        let renderer = MapRenderer::new(map, &self.config.figure, &self.config.plot.colormap)?;

        let plot = &self.config.plot;
        let labels = MapLabels {
            title: format!("{} - {}", plot.variable, date),
            colorbar_label: format!("{} ({})", plot.variable, plot.units),
        };
        let figure = renderer.render(&grid, &basemap, &labels, self.orientation)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_path(date);
        figure.save(&path)?;

        let (width, height) = figure.dimensions();
        info!(
            path = %path.display(),
            width = width,
            height = height,
            "Saved figure"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VegplotError;

    fn config() -> Config {
        let mut config = Config::default();
        config.figure.width = 400;
        config.figure.height = 300;
        config
    }

    fn write_grid(dir: &Path, rows: usize, cols: usize, skip_last: bool) -> PathBuf {
        let mut csv = String::from("X,Y,LAT,LONG,LAI20\n");
        for y in 1..=rows {
            for x in 1..=cols {
                if skip_last && y == rows && x == cols {
                    continue;
                }
                csv.push_str(&format!(
                    "{},{},{},{},{}\n",
                    x,
                    y,
                    39.5 + y as f64 * 0.2,
                    26.0 + x as f64 * 0.3,
                    (x * y) as f64 / 10.0
                ));
            }
        }
        let path = dir.join("grid.csv");
        std::fs::write(&path, csv).unwrap();
        path
    }

    #[test]
    fn test_invalid_orientation() {
        let result = GridPlotter::new("grid.csv", "LAI20", "out", 2012, "x", Config::default());
        match result.unwrap_err() {
            VegplotError::InvalidOrientation { value } => assert_eq!(value, "x"),
            other => panic!("Expected InvalidOrientation, got {:?}", other),
        }
    }

    #[test]
    fn test_orientation_case_insensitive() {
        let plotter = GridPlotter::new("grid.csv", "LAI20", "out", 2012, "V", Config::default()).unwrap();
        assert_eq!(plotter.orientation(), ColorbarOrientation::Vertical);
        let plotter = GridPlotter::new("grid.csv", "LAI20", "out", 2012, "h", Config::default()).unwrap();
        assert_eq!(plotter.orientation(), ColorbarOrientation::Horizontal);
    }

    #[test]
    fn test_output_filename() {
        let plotter = GridPlotter::new("grid.csv", "LAI20", "out", 2012, "v", Config::default()).unwrap();
        let date = plotter.acquisition_date().unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2012, 6, 1).unwrap());
        assert_eq!(
            plotter.output_filename(date),
            "LAIv_preprocess_output__date_2012-06-01.png"
        );
        assert_eq!(
            plotter.output_path(date),
            PathBuf::from("out/LAIv_preprocess_output__date_2012-06-01.png")
        );
    }

    #[test]
    fn test_plot_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_grid(dir.path(), 4, 5, false);
        let out = dir.path().join("figures");

        let plotter = GridPlotter::new(&csv, "LAI20", &out, 2012, "h", config()).unwrap();
        let path = plotter.plot().unwrap();

        assert_eq!(path, out.join("LAIv_preprocess_output__date_2012-06-01.png"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn test_shape_mismatch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        // 99 rows against a 10 x 10 grid
        let csv = write_grid(dir.path(), 10, 10, true);
        let out = dir.path().join("figures");

        let plotter = GridPlotter::new(&csv, "LAI20", &out, 2012, "v", config()).unwrap();
        let table = plotter.read_table().unwrap();
        assert_eq!(table.len(), 99);

        assert!(matches!(
            plotter.plot(),
            Err(VegplotError::ShapeMismatch { len: 99, .. })
        ));
        assert!(!out.exists());
    }

    #[test]
    fn test_bad_suffix_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_grid(dir.path(), 2, 2, false);
        std::fs::write(
            &csv,
            std::fs::read_to_string(&csv).unwrap().replace("LAI20", "LAIxx"),
        )
        .unwrap();
        let out = dir.path().join("figures");

        let plotter = GridPlotter::new(&csv, "LAIxx", &out, 2012, "v", config()).unwrap();
        assert!(matches!(
            plotter.plot(),
            Err(VegplotError::InvalidPeriodSuffix { .. })
        ));
        assert!(!out.exists());
    }
}
