//! vegplot - map plots of preprocessed vegetation index grids
//!
//! This is the main entry point for the vegplot command line tool.

use tracing::{error, info};

use vegplot::{init_tracing, log_error, Config, GridPlotter, Result};

fn main() -> Result<()> {
    // Load configuration
    let (config, request) = match Config::load() {
        Ok(loaded) => loaded,
        Err(e) => {
            init_tracing("info");
            error!("Configuration error: {}", e);
            return Err(e);
        }
    };

    // Validate before initializing tracing so a bad level falls back to info
    let validation = config.validate();
    init_tracing(if validation.is_ok() {
        &config.log_level
    } else {
        "info"
    });
    validation.map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    info!("Starting vegplot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        csv_file = %request.csv_file.display(),
        column = %request.column,
        year = request.year,
        "Plotting grid column"
    );

    let plotter = GridPlotter::from_request(request, config).map_err(|e| {
        log_error(&e, "plotter setup");
        e
    })?;

    let path = plotter.plot().map_err(|e| {
        log_error(&e, "plot");
        e
    })?;

    info!("Figure written to {}", path.display());
    Ok(())
}
