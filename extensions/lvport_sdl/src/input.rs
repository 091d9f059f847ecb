//! SDL event conversion
//!
//! Converts SDL2 events into [`NativeEvent`]s for the input translator.

use lvport_input::{EventSource, Keycode, Modifiers, MouseButton, NativeEvent, WindowEvent};
use sdl2::event::{Event, WindowEvent as SdlWindowEvent};
use sdl2::keyboard::{Keycode as SdlKeycode, Mod};
use sdl2::mouse::{MouseButton as SdlMouseButton, MouseWheelDirection};
use sdl2::EventPump;

/// Convert SDL modifier flags
pub fn convert_modifiers(keymod: Mod) -> Modifiers {
    Modifiers {
        shift: keymod.intersects(Mod::LSHIFTMOD | Mod::RSHIFTMOD),
        ctrl: keymod.intersects(Mod::LCTRLMOD | Mod::RCTRLMOD),
        alt: keymod.intersects(Mod::LALTMOD | Mod::RALTMOD),
    }
}

pub fn convert_keycode(key: SdlKeycode) -> Keycode {
    Keycode(key as i32)
}

pub fn convert_mouse_button(button: SdlMouseButton) -> MouseButton {
    match button {
        SdlMouseButton::Left => MouseButton::Left,
        SdlMouseButton::Middle => MouseButton::Middle,
        SdlMouseButton::Right => MouseButton::Right,
        SdlMouseButton::X1 => MouseButton::Other(4),
        SdlMouseButton::X2 => MouseButton::Other(5),
        SdlMouseButton::Unknown => MouseButton::Other(0),
    }
}

pub fn convert_window_event(event: SdlWindowEvent) -> WindowEvent {
    match event {
        SdlWindowEvent::Exposed => WindowEvent::Exposed,
        SdlWindowEvent::TakeFocus => WindowEvent::TakeFocus,
        SdlWindowEvent::Close => WindowEvent::Close,
        _ => WindowEvent::Other,
    }
}

/// Convert an SDL event, or `None` for events the drivers ignore
pub fn convert_event(event: Event) -> Option<NativeEvent> {
    let native = match event {
        Event::Quit { .. } => NativeEvent::Quit,
        Event::KeyDown {
            keycode: Some(key),
            keymod,
            ..
        } => NativeEvent::KeyDown {
            keycode: convert_keycode(key),
            modifiers: convert_modifiers(keymod),
        },
        Event::KeyUp {
            keycode: Some(key),
            keymod,
            ..
        } => NativeEvent::KeyUp {
            keycode: convert_keycode(key),
            modifiers: convert_modifiers(keymod),
        },
        Event::TextInput { text, .. } => NativeEvent::TextInput(text),
        Event::MouseButtonDown {
            mouse_btn, x, y, ..
        } => NativeEvent::MouseButtonDown {
            button: convert_mouse_button(mouse_btn),
            x,
            y,
        },
        Event::MouseButtonUp {
            mouse_btn, x, y, ..
        } => NativeEvent::MouseButtonUp {
            button: convert_mouse_button(mouse_btn),
            x,
            y,
        },
        Event::MouseMotion { x, y, .. } => NativeEvent::MouseMotion { x, y },
        Event::FingerDown { x, y, .. } => NativeEvent::FingerDown { x, y },
        Event::FingerUp { x, y, .. } => NativeEvent::FingerUp { x, y },
        Event::FingerMotion { x, y, .. } => NativeEvent::FingerMotion { x, y },
        Event::MouseWheel { y, direction, .. } => {
            // Natural scrolling reports the delta inverted
            let y = match direction {
                MouseWheelDirection::Flipped => -y,
                _ => y,
            };
            NativeEvent::MouseWheel { y }
        }
        Event::Window { win_event, .. } => NativeEvent::Window(convert_window_event(win_event)),
        _ => return None,
    };
    Some(native)
}

/// Event source backed by the SDL event pump
pub struct SdlEvents {
    pump: EventPump,
}

impl SdlEvents {
    pub fn new(pump: EventPump) -> Self {
        Self { pump }
    }
}

impl EventSource for SdlEvents {
    fn poll_event(&mut self) -> Option<NativeEvent> {
        // Skip events with no native counterpart
        while let Some(event) = self.pump.poll_event() {
            if let Some(native) = convert_event(event) {
                return Some(native);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_down_with_shift() {
        let event = Event::KeyDown {
            timestamp: 0,
            window_id: 1,
            keycode: Some(SdlKeycode::Left),
            scancode: None,
            keymod: Mod::LSHIFTMOD,
            repeat: false,
        };
        assert_eq!(
            convert_event(event),
            Some(NativeEvent::KeyDown {
                keycode: Keycode::LEFT,
                modifiers: Modifiers::SHIFT,
            })
        );
    }

    #[test]
    fn test_printable_keycode_is_character() {
        assert_eq!(convert_keycode(SdlKeycode::A), Keycode(b'a' as i32));
        assert_eq!(convert_keycode(SdlKeycode::Return), Keycode::RETURN);
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let event = Event::KeyDown {
            timestamp: 0,
            window_id: 1,
            keycode: None,
            scancode: None,
            keymod: Mod::NOMOD,
            repeat: false,
        };
        assert_eq!(convert_event(event), None);
    }

    #[test]
    fn test_window_events() {
        assert_eq!(convert_window_event(SdlWindowEvent::Exposed), WindowEvent::Exposed);
        assert_eq!(convert_window_event(SdlWindowEvent::Close), WindowEvent::Close);
        assert_eq!(convert_window_event(SdlWindowEvent::Moved(3, 4)), WindowEvent::Other);
    }

    #[test]
    fn test_mouse_buttons() {
        assert_eq!(convert_mouse_button(SdlMouseButton::Left), MouseButton::Left);
        assert_eq!(convert_mouse_button(SdlMouseButton::X1), MouseButton::Other(4));
    }
}
