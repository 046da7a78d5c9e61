//! Tracing subscriber setup
//!
//! Pipeline stages log through `tracing`; binaries and tests that want to
//! see that output install a subscriber once with [`init_tracing`].

use crate::config::LoggingConfig;
use crate::error::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber
///
/// `RUST_LOG` takes precedence over `config.level`. Fails if a global
/// subscriber is already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::Configuration(format!("Invalid log filter '{}': {}", config.level, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(config.structured)
        .with_file(config.structured)
        .with_line_number(config.structured)
        .try_init()
        .map_err(|e| Error::Configuration(format!("Failed to install subscriber: {}", e)))
}
