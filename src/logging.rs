//! Logging setup for services using this crate.
//!
//! The crate itself only emits `tracing` events. Binaries that do not install
//! their own subscriber can call [`init_logging`].

use tracing_subscriber::EnvFilter;

use crate::error::{ConfigManagerError, Result};

pub const DEFAULT_LOG_DIRECTIVE: &str = "info";

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` (e.g. `"info"` or
/// `"rv16_config=debug"`) is used. Fails if a global subscriber already exists.
pub fn init_logging(default_directive: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)
            .map_err(|e| ConfigManagerError::InvalidSettings(format!("invalid log directive {}: {}", default_directive, e)))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| ConfigManagerError::InvalidSettings(format!("failed to install logger: {}", e)))
}
