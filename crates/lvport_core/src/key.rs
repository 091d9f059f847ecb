//! Engine control key codes
//!
//! Keypad devices report either a printable character (its code point) or
//! one of these control codes. Values match the engine's `LV_KEY_*` table.

/// Navigation and editing keys understood by the engine's focus groups
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ControlKey {
    Up = 17,
    Down = 18,
    Right = 19,
    Left = 20,
    Esc = 27,
    Del = 127,
    Backspace = 8,
    Enter = 10,
    Next = 9,
    Prev = 11,
    Home = 2,
    End = 3,
}

impl ControlKey {
    /// Raw code as stored in a key event
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Look a raw code back up, `None` for printable characters
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            17 => Self::Up,
            18 => Self::Down,
            19 => Self::Right,
            20 => Self::Left,
            27 => Self::Esc,
            127 => Self::Del,
            8 => Self::Backspace,
            10 => Self::Enter,
            9 => Self::Next,
            11 => Self::Prev,
            2 => Self::Home,
            3 => Self::End,
            _ => return None,
        })
    }
}

impl From<ControlKey> for u32 {
    fn from(key: ControlKey) -> Self {
        key.code()
    }
}
