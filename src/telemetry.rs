//! Logging setup.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG`, when set, takes precedence over `log.level`.
pub fn init_tracing(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| anyhow!("invalid log level '{}': {}", config.level, e))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))
}
