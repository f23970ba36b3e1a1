//! Log setup.
//!
//! The terminal belongs to the screen, so logs never go to stdout or
//! stderr. [`init_file_logging`] sends them to a file instead, through the
//! Output Filter, so a mouse report that ends up in a log message is
//! scrubbed before it is written.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is the application's call.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};
use crate::renderer::OutputFilter;

/// Install a global subscriber appending to `path`.
///
/// `RUST_LOG` takes precedence over `default_filter` (for example
/// `"spark_screen=debug"`). Fails if a global subscriber already exists.
pub fn init_file_logging(path: impl AsRef<Path>, default_filter: &str) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path.as_ref())?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(OutputFilter::new(file)))
        .try_init()
        .map_err(|err| Error::Logging(err.to_string()))
}
