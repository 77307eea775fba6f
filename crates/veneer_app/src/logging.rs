//! Logging setup
//!
//! Installs a `tracing-subscriber` fmt subscriber. The `VENEER_LOG`
//! environment variable, when set, replaces the configured filter.

use tracing_subscriber::EnvFilter;

use crate::error::{AppError, Result};

/// Environment variable that overrides the configured filter
pub const LOG_ENV: &str = "VENEER_LOG";

/// Build the filter: `VENEER_LOG` if set and valid, else `directives`
pub fn build_filter(directives: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    EnvFilter::try_new(directives).map_err(|err| AppError::LogFilter {
        filter: directives.to_string(),
        message: err.to_string(),
    })
}

/// Install the global subscriber
///
/// Returns `Ok(false)` when a subscriber was already installed, so calling
/// this more than once is harmless.
pub fn init_logging(directives: &str) -> Result<bool> {
    let filter = build_filter(directives)?;
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(directives, "logging initialized");
    }
    Ok(installed)
}
