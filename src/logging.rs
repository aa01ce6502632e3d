//! Tracing subscriber setup
//!
//! The dashboard owns the terminal in raw mode, so it logs to a file in the cache
//! directory. The JSON report logs to stderr and keeps stdout for the report.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "mintdash=info";

/// Name of the log file written by the dashboard
pub const LOG_FILE: &str = "mintdash.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
}

/// Opens `dir/mintdash.log` for appending, creating the directory if needed
pub fn open_log_file(dir: &Path) -> io::Result<(File, PathBuf)> {
    fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((file, path))
}

/// Sends logs to `dir/mintdash.log`
///
/// Returns the log path. A subscriber that is already installed is left alone.
pub fn init_file(dir: &Path) -> io::Result<PathBuf> {
    let (file, path) = open_log_file(dir)?;
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init();
    Ok(path)
}

/// Sends logs to stderr
pub fn init_stderr() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}
