//! lvport SDL backend
//!
//! Runs the simulator driver in a desktop window through SDL2:
//!
//! - [`SdlBackend`] opens the window and hands out the surface and event
//!   source to [`SdlDriver`](lvport_runtime::SdlDriver)
//! - [`SdlSurface`] presents the ARGB8888 framebuffer
//! - [`SdlEvents`] converts SDL events for the input translator

pub mod error;
pub mod input;
pub mod window;

pub use error::SdlError;
pub use input::{convert_event, SdlEvents};
pub use window::{window_size, SdlBackend, SdlSurface};

/// Simulator driver running on SDL2
pub type SdlSimulator = lvport_runtime::SdlDriver<SdlBackend>;
