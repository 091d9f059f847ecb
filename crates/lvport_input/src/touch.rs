//! Touch panel input
//!
//! [`TouchPanel`] adapts any [`TouchSensor`] to the engine's pointer
//! protocol. [`Xpt2046`] is a sensor for the common resistive controller,
//! driven over a [`RawTouchSource`] that performs the 3-byte SPI exchange.

use lvport_core::{Coord, IndevData, IndevKind, IndevState, InputDevice, Point, PortError, Result};

/// A touch controller that reports at most one contact point
pub trait TouchSensor {
    /// Bring the controller up for a panel of the given size
    fn init(&mut self, width: u32, height: u32) -> Result<()>;

    /// Current contact point, or `None` when nothing touches the panel
    fn touched(&mut self) -> Option<Point>;

    fn deinit(&mut self) {}
}

/// Pointer device over a touch sensor
///
/// While touched the contact point is reported as pressed and remembered.
/// Otherwise the remembered point is reported as released.
#[derive(Debug)]
pub struct TouchPanel<S> {
    sensor: S,
    last: Point,
    degraded: bool,
}

impl<S: TouchSensor> TouchPanel<S> {
    pub fn new(sensor: S) -> Self {
        Self {
            sensor,
            last: Point::default(),
            degraded: false,
        }
    }

    /// Initialise the sensor
    ///
    /// A failing sensor is logged and the panel keeps running, reporting
    /// released at the last point.
    pub fn init(&mut self, width: u32, height: u32) {
        match self.sensor.init(width, height) {
            Ok(()) => {
                self.degraded = false;
                tracing::debug!(width, height, "Touch screen initialized");
            }
            Err(e) => {
                self.degraded = true;
                tracing::error!("Touch screen initialization failed: {}", e);
            }
        }
    }

    pub fn deinit(&mut self) {
        self.sensor.deinit();
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }
}

impl<S: TouchSensor> InputDevice for TouchPanel<S> {
    fn kind(&self) -> IndevKind {
        IndevKind::Pointer
    }

    fn read(&mut self, data: &mut IndevData) -> bool {
        let contact = if self.degraded {
            None
        } else {
            self.sensor.touched()
        };
        match contact {
            Some(point) => {
                self.last = point;
                data.state = IndevState::Pressed;
            }
            None => data.state = IndevState::Released,
        }
        data.point = self.last;
        data.continue_reading = false;
        false
    }
}

// ============================================================================
// XPT2046
// ============================================================================

/// Performs one 3-byte full-duplex SPI exchange with chip select asserted
pub trait RawTouchSource {
    fn exchange(&mut self, frame: [u8; 3]) -> [u8; 3];
}

impl<F: FnMut([u8; 3]) -> [u8; 3]> RawTouchSource for F {
    fn exchange(&mut self, frame: [u8; 3]) -> [u8; 3] {
        self(frame)
    }
}

const START_BIT: u8 = 0b1000_0000;
const CONV_8_BIT: u8 = 0b0000_1000;
const CONV_12_BIT: u8 = 0b0000_0000;

/// Controller input channels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Channel {
    X = 0b0101_0000,
    Y = 0b0001_0000,
    Z1 = 0b0011_0000,
    Z2 = 0b0100_0000,
    T0 = 0b0000_0000,
    T1 = 0b0111_0000,
    Battery = 0b0010_0000,
    Aux = 0b0110_0000,
}

/// ADC conversion precision
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdcBits {
    Eight,
    Twelve,
}

impl AdcBits {
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            8 => Ok(AdcBits::Eight),
            12 => Ok(AdcBits::Twelve),
            other => Err(PortError::InvalidConfig(format!(
                "XPT2046 precision must be 8 or 12 bits, not {}",
                other
            ))),
        }
    }

    fn mode(self) -> u8 {
        match self {
            AdcBits::Eight => CONV_8_BIT,
            AdcBits::Twelve => CONV_12_BIT,
        }
    }

    fn decode(self, reply: [u8; 3]) -> u16 {
        match self {
            AdcBits::Eight => reply[1] as u16,
            AdcBits::Twelve => ((reply[1] as u16) << 4) | ((reply[2] as u16) >> 4),
        }
    }
}

/// Panel orientation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    Portrait,
    Landscape,
    ReversePortrait,
    ReverseLandscape,
}

impl Rotation {
    /// Rotation by quarter turns, wrapping past 3
    pub fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Rotation::Portrait,
            1 => Rotation::Landscape,
            2 => Rotation::ReversePortrait,
            _ => Rotation::ReverseLandscape,
        }
    }
}

/// Raw reading range for one axis, inclusive
pub type AxisRange = (u16, u16);

/// Maps raw controller readings to panel pixels
#[derive(Clone, Debug, PartialEq)]
pub struct Xpt2046Calibration {
    pub bits: AdcBits,
    pub ranges: [AxisRange; 2],
    pub width: u32,
    pub height: u32,
    pub rotation: Rotation,
}

impl Default for Xpt2046Calibration {
    fn default() -> Self {
        Self {
            bits: AdcBits::Twelve,
            ranges: [(100, 1900), (200, 1950)],
            width: 240,
            height: 320,
            rotation: Rotation::Portrait,
        }
    }
}

impl Xpt2046Calibration {
    /// Valid readings averaged into one position
    pub const SAMPLES: usize = 10;
    /// Readings attempted before giving up
    pub const ATTEMPTS: usize = 20;

    pub fn new(bits: u8, ranges: [AxisRange; 2], width: u32, height: u32, rotation: u8) -> Result<Self> {
        let bits = AdcBits::from_bits(bits)?;
        for (min, max) in ranges {
            if min >= max {
                return Err(PortError::InvalidConfig(format!(
                    "XPT2046 axis range {}..{} is empty",
                    min, max
                )));
            }
        }
        Ok(Self {
            bits,
            ranges,
            width,
            height,
            rotation: Rotation::from_quarter_turns(rotation),
        })
    }

    fn dim(&self, axis: usize) -> f32 {
        if axis == 0 {
            self.width as f32
        } else {
            self.height as f32
        }
    }

    /// Whether a raw reading lies within the calibrated range of its axis
    pub fn in_range(&self, axis: usize, raw: u16) -> bool {
        let (min, max) = self.ranges[axis];
        (min..=max).contains(&raw)
    }

    /// Convert a (possibly averaged) raw position to rotated pixels
    pub fn raw_to_px(&self, raw: (f32, f32)) -> Point {
        let scaled = |axis: usize, value: f32| {
            let (min, max) = self.ranges[axis];
            let scale = self.dim(axis) / (max as f32 - min as f32);
            (scale * (value - min as f32)) as i32
        };
        let x = scaled(0, raw.0);
        let y = scaled(1, raw.1);
        let w = self.width as i32;
        let h = self.height as i32;
        let (px, py) = match self.rotation {
            Rotation::Portrait => (w - x, y),
            Rotation::Landscape => (h - y, x),
            Rotation::ReversePortrait => (x, h - y),
            Rotation::ReverseLandscape => (y, w - x),
        };
        Point::new(px as Coord, py as Coord)
    }

    /// Average valid raw samples into a pixel position
    ///
    /// Calls `sample` up to [`ATTEMPTS`](Self::ATTEMPTS) times and stops as
    /// soon as [`SAMPLES`](Self::SAMPLES) valid readings were collected.
    /// Returns `None` if the attempts run out first.
    pub fn average<F>(&self, mut sample: F) -> Option<Point>
    where
        F: FnMut() -> Option<(u16, u16)>,
    {
        let mut sum = (0u32, 0u32);
        let mut valid = 0usize;
        for _ in 0..Self::ATTEMPTS {
            if let Some((x, y)) = sample() {
                sum.0 += x as u32;
                sum.1 += y as u32;
                valid += 1;
                if valid == Self::SAMPLES {
                    let n = Self::SAMPLES as f32;
                    return Some(self.raw_to_px((sum.0 as f32 / n, sum.1 as f32 / n)));
                }
            }
        }
        None
    }
}

/// XPT2046 resistive touch controller
#[derive(Debug)]
pub struct Xpt2046<R> {
    source: R,
    calibration: Xpt2046Calibration,
}

impl<R: RawTouchSource> Xpt2046<R> {
    pub fn new(source: R, calibration: Xpt2046Calibration) -> Self {
        Self {
            source,
            calibration,
        }
    }

    pub fn calibration(&self) -> &Xpt2046Calibration {
        &self.calibration
    }

    /// Read one channel
    pub fn read_channel(&mut self, channel: Channel) -> u16 {
        let bits = self.calibration.bits;
        let reply = self
            .source
            .exchange([START_BIT | bits.mode() | channel as u8, 0, 0]);
        bits.decode(reply)
    }

    /// One raw position, `None` if either axis reads out of range
    pub fn raw_pos(&mut self) -> Option<(u16, u16)> {
        let x = self.read_channel(Channel::X);
        if !self.calibration.in_range(0, x) {
            return None;
        }
        let y = self.read_channel(Channel::Y);
        if !self.calibration.in_range(1, y) {
            return None;
        }
        Some((x, y))
    }

    /// Averaged pixel position, `None` when not touched
    pub fn pos(&mut self) -> Option<Point> {
        let calibration = self.calibration.clone();
        calibration.average(|| self.raw_pos())
    }
}

impl<R: RawTouchSource> TouchSensor for Xpt2046<R> {
    fn init(&mut self, width: u32, height: u32) -> Result<()> {
        self.calibration.width = width;
        self.calibration.height = height;
        Ok(())
    }

    fn touched(&mut self) -> Option<Point> {
        self.pos()
    }
}
