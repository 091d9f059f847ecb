//! SDL backend errors

use lvport_core::PortError;
use thiserror::Error;

/// Errors raised while bringing up or driving the SDL window
#[derive(Error, Debug)]
pub enum SdlError {
    /// SDL or one of its subsystems failed to initialize
    #[error("SDL init failed: {0}")]
    Init(String),

    /// The window could not be created
    #[error("window creation failed: {0}")]
    Window(String),

    /// Renderer or texture operation failed
    #[error("render failed: {0}")]
    Render(String),
}

impl From<SdlError> for PortError {
    fn from(e: SdlError) -> Self {
        match e {
            SdlError::Init(msg) | SdlError::Window(msg) => PortError::HardwareInit(msg),
            SdlError::Render(msg) => PortError::Platform(msg),
        }
    }
}
