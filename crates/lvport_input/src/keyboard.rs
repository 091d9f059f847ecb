//! Keyboard event queue and control key mapping

use std::collections::VecDeque;

use lvport_core::{ControlKey, IndevState};

use crate::event::{Keycode, Modifiers};

/// One key event waiting to be read by the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: u32,
    pub state: IndevState,
}

impl KeyEvent {
    pub fn pressed(key: u32) -> Self {
        Self {
            key,
            state: IndevState::Pressed,
        }
    }

    pub fn released(key: u32) -> Self {
        Self {
            key,
            state: IndevState::Released,
        }
    }
}

/// Fixed-capacity FIFO of key events
///
/// Events pushed while the queue is full are dropped. The queue never grows
/// past the capacity it was created with.
#[derive(Debug)]
pub struct KeyQueue {
    events: VecDeque<KeyEvent>,
    capacity: usize,
}

impl KeyQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn remaining(&self) -> usize {
        self.capacity - self.events.len()
    }

    /// Append one event. Returns `false` if it was dropped.
    pub fn push(&mut self, event: KeyEvent) -> bool {
        if self.remaining() == 0 {
            tracing::trace!(key = event.key, "keyboard queue full, dropping event");
            return false;
        }
        self.events.push_back(event);
        true
    }

    /// Append a press immediately followed by a release of `key`
    ///
    /// Both entries are written or neither is, so a reader never sees a
    /// press without its release.
    pub fn push_stroke(&mut self, key: u32) -> bool {
        if self.remaining() < 2 {
            tracing::trace!(key, "keyboard queue full, dropping keystroke");
            return false;
        }
        self.events.push_back(KeyEvent::pressed(key));
        self.events.push_back(KeyEvent::released(key));
        true
    }

    /// Remove and return the oldest event
    pub fn pop(&mut self) -> Option<KeyEvent> {
        self.events.pop_front()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Map a native key code to the engine's control key code
///
/// Keys without a control meaning pass through as their raw value.
pub fn keycode_to_ctrl_key(keycode: Keycode, modifiers: Modifiers) -> u32 {
    let key = match keycode {
        Keycode::RIGHT | Keycode::KP_PLUS => ControlKey::Right,
        Keycode::LEFT | Keycode::KP_MINUS => ControlKey::Left,
        Keycode::UP => ControlKey::Up,
        Keycode::DOWN => ControlKey::Down,
        Keycode::ESCAPE => ControlKey::Esc,
        Keycode::BACKSPACE => ControlKey::Backspace,
        Keycode::DELETE => ControlKey::Del,
        Keycode::KP_ENTER | Keycode::RETURN => ControlKey::Enter,
        Keycode::TAB if modifiers.shift => ControlKey::Prev,
        Keycode::TAB => ControlKey::Next,
        Keycode::PAGEDOWN => ControlKey::Next,
        Keycode::PAGEUP => ControlKey::Prev,
        Keycode::HOME => ControlKey::Home,
        Keycode::END => ControlKey::End,
        other => return other.raw(),
    };
    key.code()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order_with_flags() {
        let mut queue = KeyQueue::with_capacity(4);
        assert!(queue.push(KeyEvent::pressed('a' as u32)));
        assert!(queue.push(KeyEvent::released('a' as u32)));
        assert!(queue.push(KeyEvent::pressed('b' as u32)));

        assert_eq!(queue.pop(), Some(KeyEvent::pressed('a' as u32)));
        assert_eq!(queue.pop(), Some(KeyEvent::released('a' as u32)));
        assert_eq!(queue.pop(), Some(KeyEvent::pressed('b' as u32)));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_overflow_drops_without_corrupting() {
        let mut queue = KeyQueue::with_capacity(3);
        for key in 1..=5u32 {
            queue.push(KeyEvent::pressed(key));
        }
        assert_eq!(queue.len(), 3);
        let keys: Vec<u32> = std::iter::from_fn(|| queue.pop()).map(|e| e.key).collect();
        assert_eq!(keys, vec![1, 2, 3]);
    }

    #[test]
    fn test_stroke_needs_room_for_both_halves() {
        let mut queue = KeyQueue::with_capacity(3);
        assert!(queue.push_stroke('x' as u32));
        assert!(!queue.push_stroke('y' as u32));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_control_key_mapping() {
        let none = Modifiers::NONE;
        assert_eq!(keycode_to_ctrl_key(Keycode::RIGHT, none), ControlKey::Right.code());
        assert_eq!(keycode_to_ctrl_key(Keycode::KP_PLUS, none), ControlKey::Right.code());
        assert_eq!(keycode_to_ctrl_key(Keycode::KP_MINUS, none), ControlKey::Left.code());
        assert_eq!(keycode_to_ctrl_key(Keycode::RETURN, none), ControlKey::Enter.code());
        assert_eq!(keycode_to_ctrl_key(Keycode::DELETE, none), ControlKey::Del.code());
        assert_eq!(keycode_to_ctrl_key(Keycode::TAB, none), ControlKey::Next.code());
        assert_eq!(
            keycode_to_ctrl_key(Keycode::TAB, Modifiers::SHIFT),
            ControlKey::Prev.code()
        );
        assert_eq!(keycode_to_ctrl_key(Keycode::PAGEUP, none), ControlKey::Prev.code());
        assert_eq!(keycode_to_ctrl_key(Keycode::HOME, none), ControlKey::Home.code());
        assert_eq!(keycode_to_ctrl_key(Keycode(b'q' as i32), none), 'q' as u32);
    }
}
