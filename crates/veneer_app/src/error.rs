//! Error types for veneer_app

use std::path::PathBuf;

use thiserror::Error;
use veneer_layout::TreeError;
use veneer_platform::PlatformError;

/// Errors that can occur while setting up or running an application
#[derive(Error, Debug)]
pub enum AppError {
    /// The configuration file could not be read
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for [`AppConfig`](crate::AppConfig)
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The log filter directive could not be parsed
    #[error("invalid log filter {filter:?}: {message}")]
    LogFilter { filter: String, message: String },

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Result type for veneer_app operations
pub type Result<T> = std::result::Result<T, AppError>;
