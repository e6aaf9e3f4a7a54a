//! # vegplot
//!
//! Map plots of preprocessed vegetation index grids.
//!
//! This library reads a CSV table holding one measurement column per 8-day
//! composite period together with the cell coordinates, reshapes the chosen
//! column into a 2-D lattice, derives the period's calendar date from the
//! column name and renders the lattice on a Lambert Conformal map as a PNG.
//!
//! ## Pipeline
//!
//! - **Table**: loads the measurement, `LAT`, `LONG`, `X` and `Y` columns
//! - **Grid**: reshapes the columns to `(max(Y), max(X))`, row-major
//! - **Calendar**: turns the two-digit period suffix and a year into a date
//! - **Render**: draws the projected mesh with basemap layers, grid lines,
//!   title and color bar, then writes the PNG
//!
//! ```no_run
//! use vegplot::{Config, GridPlotter};
//!
//! let plotter = GridPlotter::new(
//!     "preprocess_output.csv",
//!     "LAI20",
//!     "figures",
//!     2012,
//!     "v",
//!     Config::default(),
//! )?;
//! let path = plotter.plot()?;
//! println!("{}", path.display());
//! # Ok::<(), vegplot::VegplotError>(())
//! ```

pub mod basemap;
pub mod calendar;
pub mod colormaps;
pub mod config;
pub mod error;
pub mod grid;
pub mod logging;
pub mod plotter;
pub mod projection;
pub mod render;
pub mod table;

pub use config::Config;
pub use error::{Result, VegplotError};
pub use grid::Grid;
pub use logging::{
    generate_run_id, init_tracing, log_error, log_grid_load_stats, log_operation_end,
    log_operation_start, log_timed_operation,
};
pub use plotter::GridPlotter;
pub use render::ColorbarOrientation;
pub use table::{load_table, GridTable};
