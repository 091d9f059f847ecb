//! lvport input
//!
//! Converts native platform events into the state the engine polls through
//! its input devices.
//!
//! ```text
//! EventSource -> EventTranslator -> InputState -> {Pointer,Wheel,Keyboard}Reader -> engine
//! ```
//!
//! Touch controllers ([`TouchPanel`] over [`Xpt2046`] or [`EvdevTouch`]) and host-driven
//! [`CallbackDevice`]s implement the same [`InputDevice`](lvport_core::InputDevice)
//! protocol and can be kept in an [`InputRegistry`].

pub mod callback;
pub mod evdev;
pub mod event;
pub mod keyboard;
pub mod readers;
pub mod registry;
pub mod state;
pub mod touch;
pub mod translator;

pub use callback::CallbackDevice;
pub use evdev::{EvdevCalibration, EvdevTouch, RawEventSource, RawInputEvent};
pub use event::{EventSource, Keycode, Modifiers, MouseButton, NativeEvent, WindowEvent};
pub use keyboard::{keycode_to_ctrl_key, KeyEvent, KeyQueue};
pub use readers::{KeyboardReader, PointerReader, WheelReader};
pub use registry::{DeviceId, DynDevice, InputRegistry};
pub use state::{InputState, PointerState, QuitFlag, WheelState};
pub use touch::{
    AdcBits, Channel, RawTouchSource, Rotation, TouchPanel, TouchSensor, Xpt2046,
    Xpt2046Calibration,
};
pub use translator::{EventTranslator, PumpSummary, Translated};
