//! Script bindings
//!
//! Marshals calls from the scripting runtime into engine and driver
//! operations.
//!
//! ```text
//! script call ─► BindingTable ─► FromScript args ─► WidgetBackend / DriverModule
//!                                                        │
//! script value ◄──────────── IntoScript result ◄─────────┘
//! ```
//!
//! Widgets cross the boundary as typed [`ObjHandle`]s checked against a
//! generational [`HandleArena`]; driver callbacks cross as [`PtrObject`]
//! tokens that the engine hands back to [`Session::invoke`].

pub mod convert;
pub mod handle;
pub mod modules;
pub mod ptr;
pub mod table;
pub mod value;
pub mod widgets;

pub use convert::{arg, check_arity, FromScript, IntoScript};
pub use handle::{HandleArena, HandleKey, NativeId, ObjHandle};
pub use modules::{standard_table, DriverCall, DriverModule, Session};
pub use ptr::{CallbackRole, PtrObject};
pub use table::{Binding, BindingTable, Handler};
pub use value::ScriptValue;
pub use widgets::{
    register_widgets, Align, MemoryBackend, MemoryWidget, WidgetBackend, WidgetClass,
    WidgetContext,
};
