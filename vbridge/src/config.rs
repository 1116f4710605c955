//! User configuration read from `$XDG_CONFIG_HOME/vbridge/config.toml`.
//!
//! Every key is optional. A missing file yields the defaults; a file that
//! cannot be read or parsed is a soft failure: it is logged and the defaults
//! are used, so a broken config never prevents startup.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Verifier executable used when neither the config nor the run file names one.
pub const DEFAULT_VERIFIER: &str = "pate";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Theme name, `dark` or `catppuccin-mocha`.
    pub theme: String,
    /// Include counter-example traces in graph node text.
    pub show_ce_trace: bool,
    /// Verifier executable, looked up on `PATH` unless it contains a slash.
    pub verifier: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "catppuccin-mocha".to_owned(),
            show_ce_trace: false,
            verifier: DEFAULT_VERIFIER.to_owned(),
        }
    }
}

impl Config {
    /// Loads the config from the default location, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        match Self::load_from(&path) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring config file");
                Self::default()
            }
        }
    }

    /// Reads and parses `path`. Returns `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ConfigError::Read { path: path.to_owned(), source }),
        };
        toml::from_str(&raw)
            .map(Some)
            .map_err(|source| ConfigError::Parse { path: path.to_owned(), source })
    }
}

/// Resolves an XDG base directory, falling back to `~/<home_suffix>`.
pub fn xdg_dir(var: &str, home_suffix: &str) -> PathBuf {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(home_suffix)))
        .unwrap_or_else(|| PathBuf::from(home_suffix))
}

/// Returns the path to the vbridge config file.
///
/// Prefers `$XDG_CONFIG_HOME/vbridge/config.toml`; falls back to
/// `~/.config/vbridge/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config").join("vbridge").join("config.toml")
}
