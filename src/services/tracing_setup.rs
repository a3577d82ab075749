//! Global tracing subscriber for the editor binary.
//!
//! The terminal is owned by the UI, so diagnostics go to a log file. The
//! filter comes from `RUST_LOG` when set, otherwise `info`.

use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default log file location: `<temp dir>/teditor.log`
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("teditor.log")
}

/// Install the global subscriber writing to `log_file`.
///
/// Returns false if the file can't be opened or a subscriber is already
/// installed; the editor keeps running without logs in that case.
pub fn init_global(log_file: &Path) -> bool {
    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", log_file.display(), e);
            return false;
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false),
        )
        .with(filter)
        .try_init()
        .is_ok()
}
