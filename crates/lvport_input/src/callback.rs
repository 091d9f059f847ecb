//! Input device driven by a user callback
//!
//! Lets the host control input from its own code instead of a hardware
//! driver: every read is forwarded to a closure that fills the record.

use std::fmt;

use lvport_core::{IndevData, IndevKind, InputDevice};

type ReadFn = Box<dyn FnMut(&mut IndevData) -> bool + Send>;
type HookFn = Box<dyn FnMut() + Send>;

/// A generic input device whose read is a closure
pub struct CallbackDevice {
    kind: IndevKind,
    read: ReadFn,
    init: Option<HookFn>,
    deinit: Option<HookFn>,
}

impl CallbackDevice {
    pub fn new<F>(kind: IndevKind, read: F) -> Self
    where
        F: FnMut(&mut IndevData) -> bool + Send + 'static,
    {
        Self {
            kind,
            read: Box::new(read),
            init: None,
            deinit: None,
        }
    }

    /// Hook run by [`init`](Self::init)
    pub fn on_init<F: FnMut() + Send + 'static>(mut self, hook: F) -> Self {
        self.init = Some(Box::new(hook));
        self
    }

    /// Hook run by [`deinit`](Self::deinit)
    pub fn on_deinit<F: FnMut() + Send + 'static>(mut self, hook: F) -> Self {
        self.deinit = Some(Box::new(hook));
        self
    }

    pub fn init(&mut self) {
        if let Some(hook) = self.init.as_mut() {
            hook();
        }
    }

    pub fn deinit(&mut self) {
        if let Some(hook) = self.deinit.as_mut() {
            hook();
        }
    }
}

impl InputDevice for CallbackDevice {
    fn kind(&self) -> IndevKind {
        self.kind
    }

    fn read(&mut self, data: &mut IndevData) -> bool {
        let more = (self.read)(data);
        data.continue_reading = more;
        more
    }
}

impl fmt::Debug for CallbackDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackDevice")
            .field("kind", &self.kind)
            .field("has_init", &self.init.is_some())
            .field("has_deinit", &self.deinit.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvport_core::{IndevState, Point};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_read_forwards_to_closure() {
        let mut device = CallbackDevice::new(IndevKind::Pointer, |data| {
            data.point = Point::new(100, 100);
            data.state = IndevState::Pressed;
            false
        });
        let mut data = IndevData::default();
        assert!(!device.read(&mut data));
        assert_eq!(data.point, Point::new(100, 100));
        assert!(data.state.is_pressed());
    }

    #[test]
    fn test_hooks_are_optional() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut device = CallbackDevice::new(IndevKind::Keypad, |_| false).on_init(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        device.init();
        device.deinit();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
