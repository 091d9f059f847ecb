//! lvport core vocabulary
//!
//! Types shared by every lvport crate: display geometry, pixel formats, the
//! input device read protocol, control key codes, driver configuration and
//! the traits that connect drivers to the graphics engine.
//!
//! # Architecture
//!
//! The engine is not part of this workspace. Drivers reach it only through:
//!
//! - [`TickSink`] - advance the engine clock (any thread)
//! - [`TaskHandler`] - run pending engine work (engine thread only)
//! - [`FlushReady`] - acknowledge a display flush
//! - [`InputDevice`] - implemented *by* drivers, polled by the engine
//!
//! # Crates
//!
//! - `lvport_input` - event translation and input read adapters
//! - `lvport_display` - framebuffer flush and DMA2D display paths
//! - `lvport_runtime` - tick thread, scheduling, script bindings
//! - `lvport_sdl` - SDL2 desktop simulator

mod color;
mod config;
mod engine;
mod error;
mod geometry;
mod indev;
mod key;

pub use color::{blend, Argb8888, Opacity, PixelColor, Rgb565};
pub use config::{
    DriverConfig, WheelConvention, DEFAULT_HOR_RES, DEFAULT_TICK_RATE_MS, DEFAULT_VER_RES,
    TEXT_INPUT_EVENT_SIZE,
};
pub use engine::{FlushCompletion, FlushReady, TaskHandler, TickSink};
pub use error::{PortError, Result};
pub use geometry::{Area, Coord, Point};
pub use indev::{IndevData, IndevKind, IndevState, InputDevice};
pub use key::ControlKey;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::color::{Argb8888, Opacity, PixelColor, Rgb565};
    pub use crate::config::{DriverConfig, WheelConvention};
    pub use crate::engine::{FlushCompletion, FlushReady, TaskHandler, TickSink};
    pub use crate::error::{PortError, Result};
    pub use crate::geometry::{Area, Coord, Point};
    pub use crate::indev::{IndevData, IndevKind, IndevState, InputDevice};
    pub use crate::key::ControlKey;
}
