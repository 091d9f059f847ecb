//! Driver error types

use thiserror::Error;

/// Errors raised by the driver layer
///
/// Most driver paths are fire-and-forget and never surface an error (clipped
/// flushes, dropped key events, DMA timeouts). These variants cover the
/// places where a caller can act on the failure.
#[derive(Error, Debug)]
pub enum PortError {
    /// Configuration value rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read or parsed
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(String),

    /// Hardware peripheral failed to initialise
    #[error("Hardware initialization failed: {0}")]
    HardwareInit(String),

    /// Hardware transfer did not complete in time
    #[error("Hardware transfer timed out after {0} ms")]
    Timeout(u32),

    /// Input device id is not (or no longer) registered
    #[error("Unknown input device")]
    UnknownDevice,

    /// No input device has been activated
    #[error("No active input device; register and activate one before reading")]
    NoActiveDevice,

    /// Driver used before `init` or after `deinit`
    #[error("Driver not initialized: {0}")]
    NotInitialized(&'static str),

    /// Platform backend error
    #[error("Platform error: {0}")]
    Platform(String),
}

/// Result type for driver operations
pub type Result<T> = std::result::Result<T, PortError>;
