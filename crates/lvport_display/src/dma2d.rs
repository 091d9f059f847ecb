//! DMA2D accelerated display path
//!
//! MCU targets with a Chrom-ART style 2D DMA engine render straight into a
//! framebuffer in the engine's native color format. Every operation is split
//! into one single-line transfer per row, each polled with a bounded
//! timeout. A timed-out row aborts the rest of the operation; nothing is
//! retried and the engine is never told.

use lvport_core::{blend, Area, FlushCompletion, Opacity, PixelColor, PortError, Result};

/// Per-transfer poll timeout in milliseconds
pub const DMA2D_TIMEOUT: u32 = 10;

/// Transfer engine mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dma2dMode {
    /// Plain copy
    MemoryToMemory,
    /// Foreground blended over the destination
    MemoryToMemoryBlend,
    /// Constant color written to memory
    RegisterToMemory,
}

/// Source of one single-line transfer
#[derive(Clone, Copy, Debug)]
pub enum Dma2dSource<'a, C> {
    Memory(&'a [C]),
    Register(C),
}

/// A 2D DMA engine
///
/// `configure` programs the mode and foreground alpha. `transfer` starts one
/// line and polls it for completion, failing with
/// [`PortError::Timeout`] when it does not
/// finish within `timeout_ms`.
pub trait Dma2d<C: PixelColor> {
    fn configure(&mut self, mode: Dma2dMode, alpha: Opacity) -> Result<()>;

    fn transfer(&mut self, source: Dma2dSource<'_, C>, dest: &mut [C], timeout_ms: u32) -> Result<()>;

    fn deinit(&mut self) {}
}

/// Software implementation of the transfer engine
///
/// Performs transfers on the CPU. Failures can be injected to exercise the
/// abort paths.
#[derive(Clone, Debug, Default)]
pub struct SoftDma2d {
    mode: Option<Dma2dMode>,
    alpha: Opacity,
    transfers: usize,
    /// Transfer index (0-based, counted across operations) that times out
    pub fail_transfer_at: Option<usize>,
    /// Reject every `configure` call
    pub fail_configure: bool,
}

impl SoftDma2d {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed transfers so far
    pub fn transfers(&self) -> usize {
        self.transfers
    }

    pub fn mode(&self) -> Option<Dma2dMode> {
        self.mode
    }
}

impl<C: PixelColor> Dma2d<C> for SoftDma2d {
    fn configure(&mut self, mode: Dma2dMode, alpha: Opacity) -> Result<()> {
        if self.fail_configure {
            return Err(PortError::HardwareInit(format!(
                "DMA2D rejected {:?}",
                mode
            )));
        }
        self.mode = Some(mode);
        self.alpha = alpha;
        Ok(())
    }

    fn transfer(&mut self, source: Dma2dSource<'_, C>, dest: &mut [C], timeout_ms: u32) -> Result<()> {
        let mode = self
            .mode
            .ok_or(PortError::NotInitialized("DMA2D"))?;
        if self.fail_transfer_at == Some(self.transfers) {
            self.fail_transfer_at = None;
            return Err(PortError::Timeout(timeout_ms));
        }
        match (mode, source) {
            (Dma2dMode::MemoryToMemory, Dma2dSource::Memory(src)) => {
                let n = src.len().min(dest.len());
                dest[..n].copy_from_slice(&src[..n]);
            }
            (Dma2dMode::MemoryToMemoryBlend, Dma2dSource::Memory(src)) => {
                for (d, s) in dest.iter_mut().zip(src) {
                    *d = blend(*s, *d, self.alpha);
                }
            }
            (Dma2dMode::RegisterToMemory, Dma2dSource::Register(color)) => dest.fill(color),
            (mode, _) => {
                return Err(PortError::Platform(format!(
                    "source does not match DMA2D mode {:?}",
                    mode
                )))
            }
        }
        self.transfers += 1;
        Ok(())
    }

    fn deinit(&mut self) {
        self.mode = None;
    }
}

/// Framebuffer in native color format written by a DMA2D engine
#[derive(Debug)]
pub struct Dma2dDisplay<C, D> {
    width: u32,
    height: u32,
    framebuffer: Vec<C>,
    dma: D,
}

impl<C: PixelColor, D: Dma2d<C>> Dma2dDisplay<C, D> {
    pub fn new(width: u32, height: u32, dma: D) -> Self {
        Self {
            width,
            height,
            framebuffer: vec![C::default(); width as usize * height as usize],
            dma,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn framebuffer(&self) -> &[C] {
        &self.framebuffer
    }

    pub fn dma(&self) -> &D {
        &self.dma
    }

    pub fn dma_mut(&mut self) -> &mut D {
        &mut self.dma
    }

    fn configure(&mut self, mode: Dma2dMode, alpha: Opacity) -> bool {
        match self.dma.configure(mode, alpha) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("DMA2D configuration failed: {}", e);
                false
            }
        }
    }

    /// Copy a rendered area row by row and acknowledge the flush
    ///
    /// The first timed-out row ends the copy. Completion fires regardless.
    pub fn flush(&mut self, area: &Area, pixels: &[C], done: FlushCompletion<'_>) {
        let Some(clip) = area.clamp_to(self.width, self.height) else {
            done.complete();
            return;
        };
        if !self.configure(Dma2dMode::MemoryToMemory, Opacity::COVER) {
            done.complete();
            return;
        }

        let src_stride = area.width();
        let cols = clip.width();
        let skip = (clip.x1 - area.x1) as usize;
        let stride = self.width as usize;

        for y in clip.y1..=clip.y2 {
            let start = (y - area.y1) as usize * src_stride + skip;
            let Some(row) = pixels.get(start..start + cols) else {
                break;
            };
            let offset = y as usize * stride + clip.x1 as usize;
            let dest = &mut self.framebuffer[offset..offset + cols];
            if let Err(e) = self.dma.transfer(Dma2dSource::Memory(row), dest, DMA2D_TIMEOUT) {
                tracing::warn!(row = y, "DMA2D flush aborted: {}", e);
                break;
            }
        }
        done.complete();
    }

    /// Blend `src` over `dest` with the given opacity, one line
    pub fn gpu_blend(&mut self, dest: &mut [C], src: &[C], opa: Opacity) {
        if !self.configure(Dma2dMode::MemoryToMemoryBlend, opa) {
            return;
        }
        if let Err(e) = self.dma.transfer(Dma2dSource::Memory(src), dest, DMA2D_TIMEOUT) {
            tracing::warn!("DMA2D blend aborted: {}", e);
        }
    }

    /// Fill `area` of a buffer `dest_width` pixels wide with one color
    pub fn gpu_fill(&mut self, dest: &mut [C], dest_width: u32, area: &Area, color: C) {
        if area.is_empty() || area.x1 < 0 || area.y1 < 0 || area.x2 >= dest_width as i32 {
            return;
        }
        if !self.configure(Dma2dMode::RegisterToMemory, Opacity::COVER) {
            return;
        }
        let cols = area.width();
        let stride = dest_width as usize;
        for y in area.y1..=area.y2 {
            let offset = y as usize * stride + area.x1 as usize;
            let Some(row) = dest.get_mut(offset..offset + cols) else {
                break;
            };
            if let Err(e) = self.dma.transfer(Dma2dSource::Register(color), row, DMA2D_TIMEOUT) {
                tracing::warn!(row = y, "DMA2D fill aborted: {}", e);
                break;
            }
        }
    }

    /// Release the transfer engine
    pub fn deinit(&mut self) {
        self.dma.deinit();
    }

    /// Drop the framebuffer and hand the transfer engine back
    pub fn into_dma(self) -> D {
        self.dma
    }
}
