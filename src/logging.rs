//! Debug log setup.
//!
//! The terminal belongs to the pager, so nothing is logged to stderr unless `RUST_LOG`
//! asks for it. Setting `FLOWLESS_DEBUG=/some/path` appends plain-text debug records to
//! that file for the lifetime of the process.

use crate::error::{FlowlessError, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Environment variable naming the debug log file.
pub const DEBUG_LOG_ENV: &str = "FLOWLESS_DEBUG";

/// Build a logger writing to `path` (debug level), or honouring `RUST_LOG` otherwise.
pub fn build_logger(path: Option<&Path>) -> Result<env_logger::Logger> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Off);
    builder.parse_env(env_logger::Env::default());

    if let Some(path) = path {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                FlowlessError::file_error(format!("cannot open debug log {}", path.display()), e)
            })?;
        builder
            .filter_level(log::LevelFilter::Debug)
            .format_timestamp_millis()
            .write_style(env_logger::WriteStyle::Never)
            .target(env_logger::Target::Pipe(Box::new(file)));
    }

    Ok(builder.build())
}

/// Install the process logger. Returns the debug log path when one is active.
pub fn init() -> Result<Option<PathBuf>> {
    let path = std::env::var_os(DEBUG_LOG_ENV).map(PathBuf::from);
    let logger = build_logger(path.as_deref())?;
    log::set_max_level(logger.filter());
    log::set_boxed_logger(Box::new(logger))
        .map_err(|_| FlowlessError::other("logger already initialized"))?;
    Ok(path)
}
