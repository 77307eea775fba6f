//! Platform error types

use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Failed to create the host window
    #[error("Failed to create window: {0}")]
    WindowCreation(String),

    /// The host rejected a presented frame
    #[error("Failed to present frame: {0}")]
    Present(String),

    /// Failed to run or create the event loop
    #[error("Event loop error: {0}")]
    EventLoop(String),

    /// Generic platform error
    #[error("Platform error: {0}")]
    Other(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
