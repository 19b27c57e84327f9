use std::fs::OpenOptions;
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    prelude::*,
};

use crate::setting::Settings;
use crate::ENCORE_LOGLEVEL;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Could not open the log file: {0}")]
    Io(#[from] std::io::Error),
}

/// Initializes tracing: console output filtered by `ENCORE_LOGLEVEL`, plus a
/// WARN-and-above layer appending to the log file when not running in debug
/// mode.
pub fn init(settings: &Settings) -> Result<(), LoggingError> {
    let filter = if std::env::var(ENCORE_LOGLEVEL).is_ok() {
        EnvFilter::from_env(ENCORE_LOGLEVEL)
    } else {
        EnvFilter::default().add_directive(LevelFilter::INFO.into())
    };
    let registry = tracing_subscriber::registry().with(fmt::layer().with_filter(filter));
    if settings.debug {
        registry.init();
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&settings.log_file)?;
        registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(Arc::new(file))
                    .with_filter(LevelFilter::WARN),
            )
            .init();
    }
    Ok(())
}
