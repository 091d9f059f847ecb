//! lvport display
//!
//! Flush adapters that move rendered pixels from the engine into a
//! framebuffer and acknowledge each flush exactly once.
//!
//! - [`Framebuffer`] / [`Monitor`]: ARGB8888 software framebuffer presented on a
//!   [`Surface`] (the desktop simulator)
//! - [`Dma2dDisplay`]: native-format framebuffer written row by row by a
//!   [`Dma2d`] transfer engine (MCU targets)
//! - [`PanelTiming`] / [`LayerConfig`]: LCD controller setup for the panel the
//!   DMA2D framebuffer is scanned out to
//! - [`SpiPanel`]: RGB565 controller with its own frame memory, written
//!   window by window over a [`PanelBus`] (ILI9341, ST7789, ST7735)

pub mod dma2d;
pub mod framebuffer;
pub mod monitor;
pub mod panel;
pub mod spi_panel;

pub use dma2d::{Dma2d, Dma2dDisplay, Dma2dMode, Dma2dSource, SoftDma2d, DMA2D_TIMEOUT};
pub use framebuffer::{Framebuffer, FRAMEBUFFER_INIT};
pub use monitor::{MemorySurface, Monitor, Surface};
pub use panel::{ControllerTiming, LayerConfig, LayerFormat, PanelTiming};
pub use spi_panel::{BusOp, InitStep, PanelBus, PanelModel, RecordingBus, SpiPanel};
