//! Native event translation
//!
//! Turns [`NativeEvent`]s into the pointer, wheel and keyboard state that
//! the read adapters report to the engine.

use std::sync::Arc;

use lvport_core::{Coord, DriverConfig, IndevState, Point, WheelConvention};

use crate::event::{EventSource, MouseButton, NativeEvent, WindowEvent};
use crate::keyboard::{keycode_to_ctrl_key, KeyEvent};
use crate::state::{InputState, QuitFlag};

/// What the translator did with an event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Translated {
    /// Input state was updated
    Input,
    /// The window needs a full re-present
    Expose,
    /// The platform asked to close
    Quit,
    /// Nothing relevant to the drivers
    Ignored,
}

/// Outcome of draining an [`EventSource`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PumpSummary {
    pub events: usize,
    pub expose: bool,
    pub quit: bool,
}

/// Updates shared input state from native events
#[derive(Debug)]
pub struct EventTranslator {
    input: Arc<InputState>,
    quit: QuitFlag,
    hor_res: u32,
    ver_res: u32,
    zoom: f32,
    wheel_convention: WheelConvention,
}

impl EventTranslator {
    pub fn new(config: &DriverConfig, quit: QuitFlag) -> Self {
        Self {
            input: Arc::new(InputState::new(config.keyboard_capacity)),
            quit,
            hor_res: config.width,
            ver_res: config.height,
            zoom: config.zoom,
            wheel_convention: config.wheel_convention,
        }
    }

    /// Shared state read by the input adapters
    pub fn input(&self) -> Arc<InputState> {
        Arc::clone(&self.input)
    }

    pub fn quit_flag(&self) -> &QuitFlag {
        &self.quit
    }

    fn window_point(&self, x: i32, y: i32) -> Point {
        Point::new(
            (x as f32 / self.zoom) as Coord,
            (y as f32 / self.zoom) as Coord,
        )
    }

    fn finger_point(&self, x: f32, y: f32) -> Point {
        Point::new(
            (self.hor_res as f32 * x / self.zoom) as Coord,
            (self.ver_res as f32 * y / self.zoom) as Coord,
        )
    }

    fn set_pointer(&self, point: Point, pressed: Option<bool>) {
        let mut pointer = self.input.pointer.lock();
        pointer.point = point;
        if let Some(pressed) = pressed {
            pointer.pressed = pressed;
        }
    }

    fn wheel_motion(&self, y: i32) {
        let ticks = match self.wheel_convention {
            WheelConvention::Native => y.saturating_neg(),
            WheelConvention::Web => -y.signum(),
        };
        self.input.wheel.lock().accumulate(ticks);
    }

    /// Apply one native event to the input state
    pub fn handle(&self, event: &NativeEvent) -> Translated {
        match event {
            NativeEvent::KeyDown {
                keycode,
                modifiers,
            } => {
                let key = keycode_to_ctrl_key(*keycode, *modifiers);
                self.input.keys.lock().push(KeyEvent::pressed(key));
                Translated::Input
            }
            NativeEvent::KeyUp {
                keycode,
                modifiers,
            } => {
                let key = keycode_to_ctrl_key(*keycode, *modifiers);
                self.input.keys.lock().push(KeyEvent::released(key));
                Translated::Input
            }
            NativeEvent::TextInput(text) => {
                let mut keys = self.input.keys.lock();
                for ch in text.chars() {
                    if !keys.push_stroke(ch as u32) {
                        break;
                    }
                }
                Translated::Input
            }
            NativeEvent::MouseButtonDown { button, x, y } => match button {
                MouseButton::Left => {
                    self.set_pointer(self.window_point(*x, *y), Some(true));
                    Translated::Input
                }
                MouseButton::Middle => {
                    self.input.wheel.lock().state = IndevState::Pressed;
                    Translated::Input
                }
                _ => Translated::Ignored,
            },
            NativeEvent::MouseButtonUp { button, .. } => match button {
                MouseButton::Left => {
                    self.input.pointer.lock().pressed = false;
                    Translated::Input
                }
                MouseButton::Middle => {
                    self.input.wheel.lock().state = IndevState::Released;
                    Translated::Input
                }
                _ => Translated::Ignored,
            },
            NativeEvent::MouseMotion { x, y } => {
                self.set_pointer(self.window_point(*x, *y), None);
                Translated::Input
            }
            NativeEvent::FingerDown { x, y } => {
                self.set_pointer(self.finger_point(*x, *y), Some(true));
                Translated::Input
            }
            NativeEvent::FingerUp { x, y } => {
                self.set_pointer(self.finger_point(*x, *y), Some(false));
                Translated::Input
            }
            NativeEvent::FingerMotion { x, y } => {
                self.set_pointer(self.finger_point(*x, *y), None);
                Translated::Input
            }
            NativeEvent::MouseWheel { y } => {
                self.wheel_motion(*y);
                Translated::Input
            }
            NativeEvent::Window(WindowEvent::Exposed | WindowEvent::TakeFocus) => {
                Translated::Expose
            }
            NativeEvent::Window(WindowEvent::Close) | NativeEvent::Quit => {
                if !self.quit.is_requested() {
                    tracing::info!("Quit requested by platform");
                }
                self.quit.request();
                Translated::Quit
            }
            NativeEvent::Window(WindowEvent::Other) => Translated::Ignored,
        }
    }

    /// Drain every pending event from `source`
    pub fn pump<S: EventSource + ?Sized>(&self, source: &mut S) -> PumpSummary {
        let mut summary = PumpSummary::default();
        while let Some(event) = source.poll_event() {
            summary.events += 1;
            match self.handle(&event) {
                Translated::Expose => summary.expose = true,
                Translated::Quit => summary.quit = true,
                Translated::Input | Translated::Ignored => {}
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Keycode, Modifiers};
    use std::collections::VecDeque;

    fn translator(config: DriverConfig) -> EventTranslator {
        EventTranslator::new(&config, QuitFlag::new())
    }

    #[test]
    fn test_text_input_enqueues_press_release_pairs() {
        let t = translator(DriverConfig::default());
        t.handle(&NativeEvent::TextInput("abc".to_string()));
        let input = t.input();
        assert_eq!(input.pending_keys(), 6);

        let mut keys = input.keys.lock();
        for ch in ['a', 'b', 'c'] {
            assert_eq!(keys.pop(), Some(KeyEvent::pressed(ch as u32)));
            assert_eq!(keys.pop(), Some(KeyEvent::released(ch as u32)));
        }
    }

    #[test]
    fn test_text_overflow_keeps_whole_strokes() {
        let t = translator(DriverConfig::default().keyboard_capacity(5));
        t.handle(&NativeEvent::TextInput("abcd".to_string()));
        assert_eq!(t.input().pending_keys(), 4);
    }

    #[test]
    fn test_key_events_map_control_keys() {
        let t = translator(DriverConfig::default());
        t.handle(&NativeEvent::KeyDown {
            keycode: Keycode::UP,
            modifiers: Modifiers::NONE,
        });
        t.handle(&NativeEvent::KeyUp {
            keycode: Keycode::UP,
            modifiers: Modifiers::NONE,
        });
        let input = t.input();
        let mut keys = input.keys.lock();
        assert_eq!(keys.pop(), Some(KeyEvent::pressed(17)));
        assert_eq!(keys.pop(), Some(KeyEvent::released(17)));
    }

    #[test]
    fn test_motion_then_press_scaled_by_zoom() {
        let t = translator(DriverConfig::default().zoom(2.0));
        t.handle(&NativeEvent::MouseMotion { x: 100, y: 60 });
        assert!(!t.input().pointer().pressed);
        t.handle(&NativeEvent::MouseButtonDown {
            button: MouseButton::Left,
            x: 100,
            y: 60,
        });
        let pointer = t.input().pointer();
        assert!(pointer.pressed);
        assert_eq!(pointer.point, Point::new(50, 30));

        t.handle(&NativeEvent::MouseButtonUp {
            button: MouseButton::Left,
            x: 0,
            y: 0,
        });
        let pointer = t.input().pointer();
        assert!(!pointer.pressed);
        assert_eq!(pointer.point, Point::new(50, 30));
    }

    #[test]
    fn test_right_button_is_ignored() {
        let t = translator(DriverConfig::default());
        let result = t.handle(&NativeEvent::MouseButtonDown {
            button: MouseButton::Right,
            x: 10,
            y: 10,
        });
        assert_eq!(result, Translated::Ignored);
        assert_eq!(t.input().pointer(), Default::default());
    }

    #[test]
    fn test_finger_uses_resolution() {
        let t = translator(DriverConfig::default().size(480, 320));
        t.handle(&NativeEvent::FingerDown { x: 0.5, y: 0.25 });
        let pointer = t.input().pointer();
        assert!(pointer.pressed);
        assert_eq!(pointer.point, Point::new(240, 80));
    }

    #[test]
    fn test_wheel_conventions() {
        let native = translator(DriverConfig::default());
        native.handle(&NativeEvent::MouseWheel { y: -2 });
        native.handle(&NativeEvent::MouseWheel { y: 1 });
        assert_eq!(native.input().wheel().diff, 1);

        let web = translator(DriverConfig::default().wheel_convention(WheelConvention::Web));
        web.handle(&NativeEvent::MouseWheel { y: -120 });
        web.handle(&NativeEvent::MouseWheel { y: -120 });
        assert_eq!(web.input().wheel().diff, 2);
    }

    #[test]
    fn test_extreme_wheel_delta_saturates() {
        let native = translator(DriverConfig::default());
        native.handle(&NativeEvent::MouseWheel { y: i32::MIN });
        assert_eq!(native.input().wheel().diff, i16::MAX);
        native.handle(&NativeEvent::MouseWheel { y: i32::MAX });
        native.handle(&NativeEvent::MouseWheel { y: i32::MAX });
        assert_eq!(native.input().wheel().diff, i16::MIN);

        let web = translator(DriverConfig::default().wheel_convention(WheelConvention::Web));
        web.handle(&NativeEvent::MouseWheel { y: i32::MIN });
        assert_eq!(web.input().wheel().diff, 1);
    }

    #[test]
    fn test_middle_button_drives_wheel_state() {
        let t = translator(DriverConfig::default());
        t.handle(&NativeEvent::MouseButtonDown {
            button: MouseButton::Middle,
            x: 0,
            y: 0,
        });
        assert_eq!(t.input().wheel().state, IndevState::Pressed);
        assert!(!t.input().pointer().pressed);
    }

    #[test]
    fn test_pump_reports_quit_and_expose() {
        let t = translator(DriverConfig::default());
        let mut events: VecDeque<NativeEvent> = VecDeque::from(vec![
            NativeEvent::MouseMotion { x: 1, y: 1 },
            NativeEvent::Window(WindowEvent::Exposed),
            NativeEvent::Quit,
        ]);
        let summary = t.pump(&mut events);
        assert_eq!(summary.events, 3);
        assert!(summary.expose);
        assert!(summary.quit);
        assert!(t.quit_flag().is_requested());
        assert!(events.is_empty());
    }
}
