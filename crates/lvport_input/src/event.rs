//! Platform-neutral native events
//!
//! Backends convert their own event types into [`NativeEvent`] before handing
//! them to the [`EventTranslator`](crate::EventTranslator). The shape follows
//! the SDL event model since that is what every simulator backend speaks.

/// A native key code (SDL keycode numbering)
///
/// Printable keys use their character value; other keys use the scancode
/// with bit 30 set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Keycode(pub i32);

const fn scancode_to_keycode(scancode: i32) -> i32 {
    scancode | (1 << 30)
}

impl Keycode {
    pub const BACKSPACE: Keycode = Keycode(8);
    pub const TAB: Keycode = Keycode(9);
    pub const RETURN: Keycode = Keycode(b'\r' as i32);
    pub const ESCAPE: Keycode = Keycode(27);
    pub const DELETE: Keycode = Keycode(127);
    pub const HOME: Keycode = Keycode(scancode_to_keycode(74));
    pub const PAGEUP: Keycode = Keycode(scancode_to_keycode(75));
    pub const END: Keycode = Keycode(scancode_to_keycode(77));
    pub const PAGEDOWN: Keycode = Keycode(scancode_to_keycode(78));
    pub const RIGHT: Keycode = Keycode(scancode_to_keycode(79));
    pub const LEFT: Keycode = Keycode(scancode_to_keycode(80));
    pub const DOWN: Keycode = Keycode(scancode_to_keycode(81));
    pub const UP: Keycode = Keycode(scancode_to_keycode(82));
    pub const KP_MINUS: Keycode = Keycode(scancode_to_keycode(86));
    pub const KP_PLUS: Keycode = Keycode(scancode_to_keycode(87));
    pub const KP_ENTER: Keycode = Keycode(scancode_to_keycode(88));

    /// Raw value, as passed through for keys without a control mapping
    pub const fn raw(self) -> u32 {
        self.0 as u32
    }
}

/// Modifier key state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    /// Shift key is held
    pub shift: bool,
    /// Control key is held
    pub ctrl: bool,
    /// Alt key is held
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
    };
}

/// Mouse buttons
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Other(u8),
}

/// Window events the drivers care about
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowEvent {
    /// Window contents were damaged and must be re-presented
    Exposed,
    /// Window was asked to take input focus
    TakeFocus,
    /// Window close button was pressed
    Close,
    /// Anything else (moved, resized, ...)
    Other,
}

/// A native platform event
#[derive(Clone, Debug, PartialEq)]
pub enum NativeEvent {
    KeyDown {
        keycode: Keycode,
        modifiers: Modifiers,
    },
    KeyUp {
        keycode: Keycode,
        modifiers: Modifiers,
    },
    /// Committed text, possibly several characters
    TextInput(String),
    MouseButtonDown {
        button: MouseButton,
        x: i32,
        y: i32,
    },
    MouseButtonUp {
        button: MouseButton,
        x: i32,
        y: i32,
    },
    MouseMotion {
        x: i32,
        y: i32,
    },
    /// Finger events carry positions normalised to 0..1
    FingerDown {
        x: f32,
        y: f32,
    },
    FingerUp {
        x: f32,
        y: f32,
    },
    FingerMotion {
        x: f32,
        y: f32,
    },
    /// Vertical wheel motion; negative is towards the user
    MouseWheel {
        y: i32,
    },
    Window(WindowEvent),
    Quit,
}

/// A source of native events, polled once per refresh
pub trait EventSource {
    /// Return the next pending event, or `None` when the queue is empty
    fn poll_event(&mut self) -> Option<NativeEvent>;
}

impl EventSource for std::collections::VecDeque<NativeEvent> {
    fn poll_event(&mut self) -> Option<NativeEvent> {
        self.pop_front()
    }
}
