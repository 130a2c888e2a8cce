use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::hashers::DEFAULT_CHUNK_SIZE;

/// Settings loaded from `<config dir>/verifile/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Read buffer size in bytes used when streaming a file through a digest.
    pub chunk_size: usize,
    /// Start the window in dark mode.
    pub dark_mode: bool,
    /// `tracing` filter directive; `RUST_LOG` still wins when set.
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            dark_mode: false,
            log_filter: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.chunk_size > 0, "chunk_size must be greater than zero");
        Ok(())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("verifile").join("config.toml"))
}

/// Load configuration. An explicit path must exist; the default location is
/// optional and falls back to built-in defaults.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(Config::default()),
        },
    };
    let data = fs::read_to_string(&path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: Config = toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
