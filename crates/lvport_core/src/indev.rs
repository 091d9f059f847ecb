//! Input device read protocol
//!
//! The engine polls every registered input device once per scan and hands
//! it an [`IndevData`] record to fill in. A device that buffers events asks
//! to be polled again immediately by returning `true` from
//! [`InputDevice::read`], which lets the engine drain a queue before its
//! next timer tick.

use crate::geometry::Point;

/// Pressed/released state reported by an input device
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IndevState {
    #[default]
    Released,
    Pressed,
}

impl IndevState {
    pub fn is_pressed(self) -> bool {
        self == IndevState::Pressed
    }
}

impl From<bool> for IndevState {
    fn from(pressed: bool) -> Self {
        if pressed {
            IndevState::Pressed
        } else {
            IndevState::Released
        }
    }
}

/// Kind of input device, decides which [`IndevData`] fields the engine reads
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndevKind {
    /// Mouse, touchpad or touch screen: `point` + `state`
    Pointer,
    /// Keyboard or keypad: `key` + `state`
    Keypad,
    /// Rotary encoder or mouse wheel: `enc_diff` + `state`
    Encoder,
    /// Hardware buttons mapped to screen points
    Button,
}

/// The read record filled in by an input device
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndevData {
    pub point: Point,
    pub key: u32,
    pub btn_id: u32,
    pub enc_diff: i16,
    pub state: IndevState,
    pub continue_reading: bool,
}

/// An input device the engine can poll
pub trait InputDevice {
    /// Which fields of [`IndevData`] this device fills in
    fn kind(&self) -> IndevKind;

    /// Fill in `data` with the current device state
    ///
    /// Returns `true` if more buffered data is waiting and the engine should
    /// call again before the next scan. The same value is stored in
    /// `data.continue_reading`.
    fn read(&mut self, data: &mut IndevData) -> bool;
}

impl<T: InputDevice + ?Sized> InputDevice for Box<T> {
    fn kind(&self) -> IndevKind {
        (**self).kind()
    }

    fn read(&mut self, data: &mut IndevData) -> bool {
        (**self).read(data)
    }
}
