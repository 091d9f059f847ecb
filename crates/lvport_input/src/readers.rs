//! Read adapters polled by the engine
//!
//! Each reader wraps the shared [`InputState`] and reports one facet of it
//! through the [`InputDevice`] protocol.

use std::sync::Arc;

use lvport_core::{IndevData, IndevKind, IndevState, InputDevice};

use crate::state::InputState;

/// Reports the latest pointer snapshot
#[derive(Clone, Debug)]
pub struct PointerReader {
    input: Arc<InputState>,
}

impl PointerReader {
    pub fn new(input: Arc<InputState>) -> Self {
        Self { input }
    }
}

impl InputDevice for PointerReader {
    fn kind(&self) -> IndevKind {
        IndevKind::Pointer
    }

    fn read(&mut self, data: &mut IndevData) -> bool {
        let pointer = self.input.pointer();
        data.point = pointer.point;
        data.state = IndevState::from(pointer.pressed);
        data.continue_reading = false;
        false
    }
}

/// Reports accumulated wheel ticks as an encoder
#[derive(Clone, Debug)]
pub struct WheelReader {
    input: Arc<InputState>,
}

impl WheelReader {
    pub fn new(input: Arc<InputState>) -> Self {
        Self { input }
    }
}

impl InputDevice for WheelReader {
    fn kind(&self) -> IndevKind {
        IndevKind::Encoder
    }

    fn read(&mut self, data: &mut IndevData) -> bool {
        let mut wheel = self.input.wheel.lock();
        data.state = wheel.state;
        data.enc_diff = wheel.take_diff();
        data.continue_reading = false;
        false
    }
}

/// Drains the key queue one event per read
#[derive(Clone, Debug)]
pub struct KeyboardReader {
    input: Arc<InputState>,
}

impl KeyboardReader {
    pub fn new(input: Arc<InputState>) -> Self {
        Self { input }
    }
}

impl InputDevice for KeyboardReader {
    fn kind(&self) -> IndevKind {
        IndevKind::Keypad
    }

    /// An empty queue leaves `data` untouched
    fn read(&mut self, data: &mut IndevData) -> bool {
        let mut keys = self.input.keys.lock();
        match keys.pop() {
            Some(event) => {
                data.key = event.key;
                data.state = event.state;
                data.continue_reading = !keys.is_empty();
                data.continue_reading
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{MouseButton, NativeEvent};
    use crate::state::QuitFlag;
    use crate::translator::EventTranslator;
    use lvport_core::{DriverConfig, Point};

    fn setup(config: DriverConfig) -> EventTranslator {
        EventTranslator::new(&config, QuitFlag::new())
    }

    #[test]
    fn test_pointer_reports_pressed_position() {
        let t = setup(DriverConfig::default().zoom(2.0));
        t.handle(&NativeEvent::MouseMotion { x: 40, y: 20 });
        t.handle(&NativeEvent::MouseButtonDown {
            button: MouseButton::Left,
            x: 40,
            y: 20,
        });

        let mut reader = PointerReader::new(t.input());
        let mut data = IndevData::default();
        assert!(!reader.read(&mut data));
        assert_eq!(data.point, Point::new(20, 10));
        assert_eq!(data.state, IndevState::Pressed);
    }

    #[test]
    fn test_wheel_read_resets_delta() {
        let t = setup(DriverConfig::default());
        for _ in 0..3 {
            t.handle(&NativeEvent::MouseWheel { y: -1 });
        }

        let mut reader = WheelReader::new(t.input());
        let mut data = IndevData::default();
        reader.read(&mut data);
        assert_eq!(data.enc_diff, 3);
        reader.read(&mut data);
        assert_eq!(data.enc_diff, 0);
    }

    #[test]
    fn test_keyboard_drains_with_continue_flag() {
        let t = setup(DriverConfig::default());
        t.handle(&NativeEvent::TextInput("ab".to_string()));

        let mut reader = KeyboardReader::new(t.input());
        let mut data = IndevData::default();
        let mut reads = Vec::new();
        loop {
            let more = reader.read(&mut data);
            reads.push((data.key, data.state, more));
            if !more {
                break;
            }
        }
        let a = 'a' as u32;
        let b = 'b' as u32;
        assert_eq!(
            reads,
            vec![
                (a, IndevState::Pressed, true),
                (a, IndevState::Released, true),
                (b, IndevState::Pressed, true),
                (b, IndevState::Released, false),
            ]
        );
    }

    #[test]
    fn test_keyboard_empty_leaves_data_untouched() {
        let t = setup(DriverConfig::default());
        let mut reader = KeyboardReader::new(t.input());
        let mut data = IndevData {
            key: 42,
            state: IndevState::Pressed,
            ..Default::default()
        };
        assert!(!reader.read(&mut data));
        assert_eq!(data.key, 42);
        assert_eq!(data.state, IndevState::Pressed);
    }
}
