use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use color_eyre::eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;

const APP_DIR: &str = "dex-events";
const LOG_FILE: &str = "dex-events.log";

/// Default log location: ~/.cache/dex-events/dex-events.log (platform equivalent).
pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join(APP_DIR).join(LOG_FILE))
}

/// Send tracing output to a file; the terminal belongs to the TUI.
///
/// `RUST_LOG` wins over `level` when set. Returns the path being written.
pub fn init(path: Option<PathBuf>, level: &str) -> Result<PathBuf> {
    let path = path
        .or_else(default_log_path)
        .ok_or_else(|| eyre!("could not determine a log directory, pass --log-file"))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| eyre!("failed to install logger: {e}"))?;

    Ok(path)
}
