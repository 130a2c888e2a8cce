//! Logging init: structured `tracing` output on stderr.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,verifile=debug";

/// `RUST_LOG` wins, then the configured filter, then the built-in default.
fn env_filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init_logging(configured: Option<&str>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(configured))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))?;
    Ok(())
}
