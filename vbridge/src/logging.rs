//! File-backed tracing setup.
//!
//! The TUI owns the terminal, so log output goes to
//! `$XDG_STATE_HOME/vbridge/vbridge.log` (fallback `~/.local/state/...`),
//! truncated at startup. The filter comes from `VBRIDGE_LOG` and defaults to
//! `warn`; `VBRIDGE_LOG=verifier=debug` also captures the verifier's stderr.

use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::xdg_dir;

pub const LOG_ENV: &str = "VBRIDGE_LOG";

pub fn log_path() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", ".local/state").join("vbridge").join("vbridge.log")
}

/// Installs the global subscriber and returns the log file's path.
pub fn init() -> std::io::Result<PathBuf> {
    let path = log_path();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let log_file = std::fs::File::create(&path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_thread_names(true)
        .init();
    Ok(path)
}
