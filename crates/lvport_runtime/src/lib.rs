//! lvport runtime
//!
//! Glue between a scripting runtime, the graphics engine and the platform
//! drivers:
//!
//! - [`binding`]: handle-checked calls from scripts into widgets and drivers
//! - [`lifecycle`]: init/deinit of the SDL, LCD, touch and tick modules
//! - [`tick`]: the background tick thread
//! - [`scheduler`]: bounded main-thread job queue with coalesced refreshes
//! - [`isr`]: interrupt-to-task event hand-off
//!
//! # Example
//!
//! ```ignore
//! use lvport_runtime::prelude::*;
//!
//! let mut session: Session<MemoryBackend> = Session::new(MemoryBackend::new());
//! let table = standard_table();
//! let label = table.call(&mut session, "lv", "label", &[])?;
//! table.call(&mut session, "label", "set_text", &[label, ScriptValue::Str("hello".into())])?;
//! ```

pub mod binding;
pub mod error;
pub mod isr;
pub mod lifecycle;
pub mod logging;
pub mod scheduler;
pub mod tick;

pub use error::{BindingError, BindingResult};
pub use isr::{
    spi_transaction_callbacks, IsrQueue, SpiDispatcher, SpiIsrHooks, SpiPhase,
    SpiTransactionEvent,
};
pub use lifecycle::{
    Driver, EventQueue, HeadlessBackend, HeadlessEvents, LcdDriver, PlatformBackend, SdlDriver,
    TickDriver, TsDriver, LCD_TICK_MS,
};
pub use scheduler::{Job, MainScheduler, WakeCallback, DEFAULT_SCHEDULER_DEPTH};
pub use tick::{DriftAccumulator, TickPolicy, TickThread};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::binding::{
        standard_table, BindingTable, DriverModule, MemoryBackend, ScriptValue, Session,
        WidgetBackend,
    };
    pub use crate::error::{BindingError, BindingResult};
    pub use crate::lifecycle::{Driver, LcdDriver, SdlDriver, TickDriver, TsDriver};
    pub use crate::scheduler::MainScheduler;
}
