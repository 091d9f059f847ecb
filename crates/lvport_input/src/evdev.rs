//! Linux evdev touch screens
//!
//! [`EvdevTouch`] folds absolute-axis and touch-button events from an
//! input event node into a single contact point. Readings can be
//! calibrated from the controller's raw range to panel pixels.

use lvport_core::{Coord, Point, PortError, Result};

use crate::touch::TouchSensor;

pub const EV_KEY: u16 = 0x01;
pub const EV_ABS: u16 = 0x03;
pub const ABS_X: u16 = 0x00;
pub const ABS_Y: u16 = 0x01;
pub const ABS_MT_POSITION_X: u16 = 0x35;
pub const ABS_MT_POSITION_Y: u16 = 0x36;
pub const ABS_MT_TRACKING_ID: u16 = 0x39;
pub const BTN_TOUCH: u16 = 0x14A;

/// One `input_event` record, without its timestamp
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawInputEvent {
    pub kind: u16,
    pub code: u16,
    pub value: i32,
}

impl RawInputEvent {
    pub const fn new(kind: u16, code: u16, value: i32) -> Self {
        Self { kind, code, value }
    }
}

/// Non-blocking reader of pending evdev records
pub trait RawEventSource {
    fn next_event(&mut self) -> Option<RawInputEvent>;
}

impl<F: FnMut() -> Option<RawInputEvent>> RawEventSource for F {
    fn next_event(&mut self) -> Option<RawInputEvent> {
        self()
    }
}

/// Raw controller range mapped onto the panel, inclusive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvdevCalibration {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl EvdevCalibration {
    pub fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Result<Self> {
        if min_x == max_x || min_y == max_y {
            return Err(PortError::InvalidConfig(format!(
                "evdev calibration range {}..{} x {}..{} is empty",
                min_x, max_x, min_y, max_y
            )));
        }
        Ok(Self {
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    fn map(value: i32, min: i32, max: i32, res: u32) -> i64 {
        (value as i64 - min as i64) * res as i64 / (max as i64 - min as i64)
    }
}

/// Touch screen behind an evdev node
#[derive(Debug)]
pub struct EvdevTouch<R> {
    source: R,
    swap_axes: bool,
    calibration: Option<EvdevCalibration>,
    width: u32,
    height: u32,
    raw: (i32, i32),
    pressed: bool,
}

impl<R: RawEventSource> EvdevTouch<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            swap_axes: false,
            calibration: None,
            width: 0,
            height: 0,
            raw: (0, 0),
            pressed: false,
        }
    }

    /// Treat the controller's X axis as the panel's Y axis and vice versa
    pub fn with_swapped_axes(mut self, swap: bool) -> Self {
        self.swap_axes = swap;
        self
    }

    pub fn calibrate(&mut self, calibration: EvdevCalibration) {
        self.calibration = Some(calibration);
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Last raw position after axis swapping
    pub fn raw_position(&self) -> (i32, i32) {
        self.raw
    }

    fn apply(&mut self, event: RawInputEvent) {
        match (event.kind, event.code) {
            (EV_ABS, ABS_X | ABS_MT_POSITION_X) => {
                if self.swap_axes {
                    self.raw.1 = event.value;
                } else {
                    self.raw.0 = event.value;
                }
            }
            (EV_ABS, ABS_Y | ABS_MT_POSITION_Y) => {
                if self.swap_axes {
                    self.raw.0 = event.value;
                } else {
                    self.raw.1 = event.value;
                }
            }
            (EV_ABS, ABS_MT_TRACKING_ID) => self.pressed = event.value != -1,
            (EV_KEY, BTN_TOUCH) => match event.value {
                0 => self.pressed = false,
                1 => self.pressed = true,
                // autorepeat
                _ => {}
            },
            _ => {}
        }
    }

    /// Drain pending events into the contact state
    pub fn poll(&mut self) {
        while let Some(event) = self.source.next_event() {
            self.apply(event);
        }
    }

    /// Current position in panel pixels, clamped to the panel
    pub fn position(&self) -> Point {
        let (mut x, mut y) = (self.raw.0 as i64, self.raw.1 as i64);
        if let Some(c) = self.calibration {
            x = EvdevCalibration::map(self.raw.0, c.min_x, c.max_x, self.width);
            y = EvdevCalibration::map(self.raw.1, c.min_y, c.max_y, self.height);
        }
        let clamp = |v: i64, res: u32| v.clamp(0, (res as i64 - 1).max(0)).min(Coord::MAX as i64) as Coord;
        Point::new(clamp(x, self.width), clamp(y, self.height))
    }
}

impl<R: RawEventSource> TouchSensor for EvdevTouch<R> {
    fn init(&mut self, width: u32, height: u32) -> Result<()> {
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn touched(&mut self) -> Option<Point> {
        self.poll();
        self.pressed.then(|| self.position())
    }
}
