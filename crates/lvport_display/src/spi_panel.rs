//! SPI panel flush path
//!
//! Small TFT controllers (ILI9341, ST7789, ST7735) keep their own frame
//! memory. A flush selects a window with CASET/RASET and streams the pixels
//! after RAMWR, high byte first. The controller is reached through a
//! [`PanelBus`] that drives the data/command line and the SPI transfer.

use lvport_core::{Area, FlushCompletion, PortError, Result, Rgb565};

pub const SWRESET: u8 = 0x01;
pub const SLPOUT: u8 = 0x11;
pub const NORON: u8 = 0x13;
pub const INVOFF: u8 = 0x20;
pub const DISPON: u8 = 0x29;
pub const CASET: u8 = 0x2A;
pub const RASET: u8 = 0x2B;
pub const RAMWR: u8 = 0x2C;
pub const MADCTL: u8 = 0x36;
pub const COLMOD: u8 = 0x3A;

/// MADCTL bits
pub mod madctl {
    pub const MY: u8 = 0x80;
    pub const MX: u8 = 0x40;
    pub const MV: u8 = 0x20;
    pub const ML: u8 = 0x10;
    pub const BGR: u8 = 0x08;
}

/// 16 bits per pixel, 65K colors
const COLMOD_RGB565: u8 = 0x55;

/// Pixels per data transfer when filling
const FILL_CHUNK: usize = 128;

/// Wire access to a panel controller
///
/// `command` sends one byte with D/C low, `data` sends bytes with D/C high.
pub trait PanelBus {
    fn command(&mut self, cmd: u8) -> Result<()>;

    fn data(&mut self, bytes: &[u8]) -> Result<()>;

    fn delay_ms(&mut self, _ms: u32) {}

    /// Toggle the reset line, if the panel has one
    fn hard_reset(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One step of a controller init sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitStep {
    pub cmd: u8,
    pub data: &'static [u8],
    pub delay_ms: u32,
}

const fn step(cmd: u8, data: &'static [u8]) -> InitStep {
    InitStep { cmd, data, delay_ms: 0 }
}

const fn wait(cmd: u8, delay_ms: u32) -> InitStep {
    InitStep { cmd, data: &[], delay_ms }
}

const ILI9341_INIT: &[InitStep] = &[
    step(0xCF, &[0x00, 0x83, 0x30]),
    step(0xED, &[0x64, 0x03, 0x12, 0x81]),
    step(0xE8, &[0x85, 0x01, 0x79]),
    step(0xCB, &[0x39, 0x2C, 0x00, 0x34, 0x02]),
    step(0xF7, &[0x20]),
    step(0xEA, &[0x00, 0x00]),
    step(0xC0, &[0x26]),
    step(0xC1, &[0x11]),
    step(0xC5, &[0x35, 0x3E]),
    step(0xC7, &[0xBE]),
    step(COLMOD, &[COLMOD_RGB565]),
    step(0xB1, &[0x00, 0x1B]),
    step(0xF2, &[0x08]),
    step(0x26, &[0x01]),
    step(
        0xE0,
        &[0x1F, 0x1A, 0x18, 0x0A, 0x0F, 0x06, 0x45, 0x87, 0x32, 0x0A, 0x07, 0x02, 0x07, 0x05, 0x00],
    ),
    step(
        0xE1,
        &[0x00, 0x25, 0x27, 0x05, 0x10, 0x09, 0x3A, 0x78, 0x4D, 0x05, 0x18, 0x0D, 0x38, 0x3A, 0x1F],
    ),
    step(0xB7, &[0x07]),
    step(0xB6, &[0x0A, 0x82, 0x27, 0x00]),
    wait(SLPOUT, 100),
    wait(DISPON, 100),
];

const ST7789_INIT: &[InitStep] = &[
    wait(SLPOUT, 100),
    step(COLMOD, &[COLMOD_RGB565]),
    // porch control
    step(0xB2, &[0x0C, 0x0C, 0x00, 0x33, 0x33]),
    step(0xB7, &[0x35]),
    step(0xC0, &[0x3C]),
    step(0xC2, &[0x01]),
    step(0xC3, &[0x0B]),
    step(0xC4, &[0x20]),
    // 60 Hz
    step(0xC6, &[0x0F]),
    step(0xD0, &[0xA4, 0xA1]),
    step(
        0xE0,
        &[0xD0, 0x01, 0x08, 0x0F, 0x11, 0x2A, 0x36, 0x55, 0x44, 0x3A, 0x0B, 0x06, 0x11, 0x20],
    ),
    step(
        0xE1,
        &[0xD0, 0x02, 0x07, 0x0A, 0x0B, 0x18, 0x34, 0x43, 0x4A, 0x2B, 0x1B, 0x1C, 0x22, 0x1F],
    ),
    step(0x55, &[0b1011_0000]),
    wait(DISPON, 100),
];

const ST7735R_INIT: &[InitStep] = &[
    wait(SWRESET, 50),
    wait(SLPOUT, 100),
    step(0xB1, &[0x01, 0x2C, 0x2D]),
    step(0xB2, &[0x01, 0x2C, 0x2D]),
    step(0xB3, &[0x01, 0x2C, 0x2D, 0x01, 0x2C, 0x2D]),
    step(0xB4, &[0x07]),
    step(0xC0, &[0xA2, 0x02, 0xB4]),
    step(0xC1, &[0xC5]),
    step(0xC2, &[0x0A, 0x00]),
    step(0xC3, &[0x8A, 0x2A]),
    step(0xC4, &[0x8A, 0xEE]),
    step(0xC5, &[0x0E]),
    step(INVOFF, &[]),
    step(COLMOD, &[COLMOD_RGB565]),
    step(
        0xE0,
        &[0x0F, 0x1A, 0x0F, 0x18, 0x2F, 0x28, 0x20, 0x22, 0x1F, 0x1B, 0x23, 0x37, 0x00, 0x07, 0x02, 0x10],
    ),
    step(
        0xE1,
        &[0x0F, 0x1B, 0x0F, 0x17, 0x33, 0x2C, 0x29, 0x2E, 0x30, 0x30, 0x39, 0x3F, 0x00, 0x07, 0x03, 0x10],
    ),
    wait(NORON, 10),
    wait(DISPON, 100),
];

/// Supported panel controllers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelModel {
    Ili9341,
    St7789,
    /// ST7735 with the black tab glass
    St7735Blacktab,
    /// ST7735 with the red tab glass, which is offset in controller memory
    St7735Redtab,
}

impl PanelModel {
    pub fn init_sequence(self) -> &'static [InitStep] {
        match self {
            PanelModel::Ili9341 => ILI9341_INIT,
            PanelModel::St7789 => ST7789_INIT,
            PanelModel::St7735Blacktab | PanelModel::St7735Redtab => ST7735R_INIT,
        }
    }

    /// MADCTL value for a rotation in quarter turns
    pub fn madctl(self, rotation: u8) -> u8 {
        use self::madctl::{BGR, MV, MX, MY};
        let bits = match self {
            PanelModel::Ili9341 => [MX, MV, MY, MY | MX | MV],
            _ => [0, MX | MV, MY | MX, MY | MV],
        };
        BGR | bits[(rotation % 4) as usize]
    }

    /// Column and row where the visible glass starts in controller memory
    ///
    /// `None` when the model does not come in the given resolution.
    pub fn start_offsets(self, resolution: (u16, u16), rotation: u8) -> Option<(u16, u16)> {
        let table: [(u16, u16); 4] = match (self, resolution) {
            (PanelModel::Ili9341, (240, 320)) => [(0, 0); 4],
            (PanelModel::St7789, (240, 320)) => [(0, 0); 4],
            (PanelModel::St7789, (240, 240)) => [(0, 0), (0, 0), (0, 80), (80, 0)],
            (PanelModel::St7789, (135, 240)) => [(52, 40), (40, 53), (53, 40), (40, 52)],
            (PanelModel::St7735Blacktab, (128, 160)) => [(0, 0); 4],
            (PanelModel::St7735Redtab, (128, 160)) => [(2, 1), (1, 2), (2, 1), (1, 2)],
            _ => return None,
        };
        Some(table[(rotation % 4) as usize])
    }
}

/// RGB565 panel behind a command/data bus
#[derive(Debug)]
pub struct SpiPanel<B> {
    bus: B,
    model: PanelModel,
    resolution: (u16, u16),
    rotation: u8,
    width: u32,
    height: u32,
    initialized: bool,
    scratch: Vec<u8>,
}

impl<B: PanelBus> SpiPanel<B> {
    /// `resolution` is width by height at rotation 0
    pub fn new(bus: B, model: PanelModel, resolution: (u16, u16), rotation: u8) -> Result<Self> {
        if model.start_offsets(resolution, 0).is_none() {
            return Err(PortError::InvalidConfig(format!(
                "{:?} does not support a {}x{} panel",
                model, resolution.0, resolution.1
            )));
        }
        let mut panel = Self {
            bus,
            model,
            resolution,
            rotation: 0,
            width: 0,
            height: 0,
            initialized: false,
            scratch: Vec::new(),
        };
        panel.set_rotation(rotation);
        Ok(panel)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    pub fn model(&self) -> PanelModel {
        self.model
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    fn set_rotation(&mut self, rotation: u8) {
        self.rotation = rotation % 4;
        let (w, h) = (self.resolution.0 as u32, self.resolution.1 as u32);
        (self.width, self.height) = if self.rotation % 2 == 0 { (w, h) } else { (h, w) };
    }

    fn write_register(&mut self, cmd: u8, data: &[u8]) -> Result<()> {
        self.bus.command(cmd)?;
        if !data.is_empty() {
            self.bus.data(data)?;
        }
        Ok(())
    }

    /// Reset the controller, run its init sequence and apply the rotation
    pub fn init(&mut self) -> Result<()> {
        self.initialized = false;
        self.bus.hard_reset()?;
        for step in self.model.init_sequence() {
            self.write_register(step.cmd, step.data)?;
            if step.delay_ms > 0 {
                self.bus.delay_ms(step.delay_ms);
            }
        }
        self.apply_rotation(self.rotation)?;
        self.initialized = true;
        tracing::debug!(
            model = ?self.model,
            width = self.width,
            height = self.height,
            "SPI panel initialized"
        );
        Ok(())
    }

    /// Change orientation; odd quarter turns swap width and height
    pub fn apply_rotation(&mut self, rotation: u8) -> Result<()> {
        self.set_rotation(rotation);
        let value = self.model.madctl(self.rotation);
        self.write_register(MADCTL, &[value])
    }

    /// Select the controller memory window for a `w` x `h` block at `(x, y)`
    pub fn set_window(&mut self, x: u16, y: u16, w: u16, h: u16) -> Result<()> {
        let (c0, r0) = self
            .model
            .start_offsets(self.resolution, self.rotation)
            .unwrap_or_default();
        let span = |start: u16, len: u16| {
            let first = start.wrapping_add(len.saturating_sub(1));
            let [a, b] = start.to_be_bytes();
            let [c, d] = first.to_be_bytes();
            [a, b, c, d]
        };
        self.write_register(CASET, &span(c0.saturating_add(x), w))?;
        self.write_register(RASET, &span(r0.saturating_add(y), h))
    }

    /// Write a rendered area to the panel and acknowledge the flush
    ///
    /// The area is clipped to the panel. Bus errors are logged and the
    /// rest of the flush is dropped. Completion fires on every path.
    pub fn flush(&mut self, area: &Area, pixels: &[Rgb565], done: FlushCompletion<'_>) {
        if !self.initialized {
            tracing::warn!("Flush before SPI panel init, dropped");
            done.complete();
            return;
        }
        let Some(clip) = area.clamp_to(self.width, self.height) else {
            done.complete();
            return;
        };
        if let Err(e) = self.write_area(area, &clip, pixels) {
            tracing::warn!(?clip, "SPI panel flush aborted: {}", e);
        }
        done.complete();
    }

    fn write_area(&mut self, area: &Area, clip: &Area, pixels: &[Rgb565]) -> Result<()> {
        let src_stride = area.width();
        let cols = clip.width();
        let skip = (clip.x1 - area.x1) as usize;

        self.scratch.clear();
        let mut rows = 0u16;
        for y in clip.y1..=clip.y2 {
            let start = (y - area.y1) as usize * src_stride + skip;
            let Some(row) = pixels.get(start..start + cols) else {
                break;
            };
            self.scratch.extend(row.iter().flat_map(|p| p.0.to_be_bytes()));
            rows += 1;
        }
        if rows == 0 {
            return Ok(());
        }

        self.set_window(clip.x1 as u16, clip.y1 as u16, cols as u16, rows)?;
        self.bus.command(RAMWR)?;
        self.bus.data(&self.scratch)
    }

    /// Fill the whole panel with one color
    pub fn clear(&mut self, color: Rgb565) -> Result<()> {
        let (w, h) = (self.width as u16, self.height as u16);
        self.set_window(0, 0, w, h)?;
        self.bus.command(RAMWR)?;

        let chunk = color.0.to_be_bytes().repeat(FILL_CHUNK);
        let total = self.width as usize * self.height as usize;
        for _ in 0..total / FILL_CHUNK {
            self.bus.data(&chunk)?;
        }
        let rest = total % FILL_CHUNK;
        if rest > 0 {
            self.bus.data(&chunk[..rest * 2])?;
        }
        Ok(())
    }
}

/// One recorded bus transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BusOp {
    Reset,
    Command(u8),
    Data(Vec<u8>),
    Delay(u32),
}

/// Bus that records every transaction instead of driving hardware
///
/// A command can be made to fail to exercise the abort paths.
#[derive(Clone, Debug, Default)]
pub struct RecordingBus {
    pub ops: Vec<BusOp>,
    /// Reject this command byte once
    pub fail_command: Option<u8>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Data bytes sent after each occurrence of `cmd`
    pub fn payloads(&self, cmd: u8) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        let mut current: Option<Vec<u8>> = None;
        for op in &self.ops {
            match op {
                BusOp::Command(c) => {
                    out.extend(current.take());
                    if *c == cmd {
                        current = Some(Vec::new());
                    }
                }
                BusOp::Data(bytes) => {
                    if let Some(buf) = current.as_mut() {
                        buf.extend_from_slice(bytes);
                    }
                }
                _ => {}
            }
        }
        out.extend(current);
        out
    }

    pub fn commands(&self) -> Vec<u8> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                BusOp::Command(c) => Some(*c),
                _ => None,
            })
            .collect()
    }
}

impl PanelBus for RecordingBus {
    fn command(&mut self, cmd: u8) -> Result<()> {
        if self.fail_command == Some(cmd) {
            self.fail_command = None;
            return Err(PortError::Platform(format!("SPI write of 0x{:02X} failed", cmd)));
        }
        self.ops.push(BusOp::Command(cmd));
        Ok(())
    }

    fn data(&mut self, bytes: &[u8]) -> Result<()> {
        self.ops.push(BusOp::Data(bytes.to_vec()));
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.ops.push(BusOp::Delay(ms));
    }

    fn hard_reset(&mut self) -> Result<()> {
        self.ops.push(BusOp::Reset);
        Ok(())
    }
}
