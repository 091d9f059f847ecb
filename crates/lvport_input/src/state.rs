//! Input state shared between the event translator and the read adapters
//!
//! The translator writes on the event-pump side, the readers take snapshots
//! when the engine polls. Each piece sits behind its own short-lived lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lvport_core::{IndevState, Point};
use parking_lot::Mutex;

use crate::keyboard::KeyQueue;

/// Last known pointer position and left-button state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerState {
    pub point: Point,
    pub pressed: bool,
}

/// Accumulated wheel ticks and the wheel button state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WheelState {
    pub diff: i16,
    pub state: IndevState,
}

impl WheelState {
    /// Add signed ticks, saturating at the encoder range
    pub fn accumulate(&mut self, ticks: i32) {
        let total = (self.diff as i32).saturating_add(ticks);
        self.diff = total.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
    }

    /// Return the accumulated ticks and reset them to zero
    pub fn take_diff(&mut self) -> i16 {
        std::mem::take(&mut self.diff)
    }
}

/// All input state written by one translator
#[derive(Debug)]
pub struct InputState {
    pub(crate) pointer: Mutex<PointerState>,
    pub(crate) wheel: Mutex<WheelState>,
    pub(crate) keys: Mutex<KeyQueue>,
}

impl InputState {
    pub fn new(keyboard_capacity: usize) -> Self {
        Self {
            pointer: Mutex::new(PointerState::default()),
            wheel: Mutex::new(WheelState::default()),
            keys: Mutex::new(KeyQueue::with_capacity(keyboard_capacity)),
        }
    }

    /// Copy of the current pointer snapshot
    pub fn pointer(&self) -> PointerState {
        *self.pointer.lock()
    }

    /// Copy of the current wheel state, without resetting it
    pub fn wheel(&self) -> WheelState {
        *self.wheel.lock()
    }

    /// Number of key events waiting
    pub fn pending_keys(&self) -> usize {
        self.keys.lock().len()
    }

    /// Drop all buffered input
    pub fn reset(&self) {
        *self.pointer.lock() = PointerState::default();
        *self.wheel.lock() = WheelState::default();
        self.keys.lock().clear();
    }
}

/// Process-wide "quit requested" flag
///
/// Set by the translator when the platform asks to close, or by a driver's
/// deinit. Polled by the refresh loop and the tick thread.
#[derive(Clone, Debug, Default)]
pub struct QuitFlag(Arc<AtomicBool>);

impl QuitFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag so a driver can be initialised again
    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Shared atomic, for threads that only need to poll it
    pub fn as_atomic(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_saturates() {
        let mut wheel = WheelState::default();
        wheel.accumulate(i16::MAX as i32);
        wheel.accumulate(10);
        assert_eq!(wheel.take_diff(), i16::MAX);
        assert_eq!(wheel.diff, 0);
    }

    #[test]
    fn test_quit_flag_is_shared() {
        let flag = QuitFlag::new();
        let clone = flag.clone();
        clone.request();
        assert!(flag.is_requested());
        flag.clear();
        assert!(!clone.is_requested());
    }
}
