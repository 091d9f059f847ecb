//! Software framebuffer
//!
//! The simulator keeps one ARGB8888 frame in memory. The engine writes into
//! it through [`flush`](Framebuffer::flush), [`fill`](Framebuffer::fill) and
//! [`map`](Framebuffer::map); the monitor presents it when it is dirty.

use std::sync::atomic::{AtomicBool, Ordering};

use bytemuck::Pod;
use lvport_core::{Area, FlushCompletion, PixelColor};

/// Initial framebuffer content, a mid grey
pub const FRAMEBUFFER_INIT: u32 = 0x4D4D_4D4D;

/// Copy one row of engine pixels into ARGB8888 storage
fn copy_row<C: PixelColor + Pod>(dest: &mut [u32], src: &[C]) {
    if C::IS_ARGB8888 {
        if let Ok(words) = bytemuck::try_cast_slice::<C, u32>(src) {
            dest.copy_from_slice(words);
            return;
        }
    }
    for (d, s) in dest.iter_mut().zip(src) {
        *d = s.to_argb32();
    }
}

/// Flat `width * height` ARGB8888 pixel store
#[derive(Debug)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    dirty: AtomicBool,
}

impl Framebuffer {
    /// New framebuffer filled with [`FRAMEBUFFER_INIT`], marked dirty so the
    /// first refresh presents it
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![FRAMEBUFFER_INIT; width as usize * height as usize],
            dirty: AtomicBool::new(true),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major pixel data
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Bytes per row
    pub fn pitch(&self) -> usize {
        self.width as usize * std::mem::size_of::<u32>()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Clear the dirty flag, returning whether it was set
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    /// Copy `src`, laid out row-major over `area`, into the clipped part of
    /// `area`. Returns `false` when nothing landed on screen.
    fn blit<C: PixelColor + Pod>(&mut self, area: &Area, src: &[C]) -> bool {
        let Some(clip) = area.clamp_to(self.width, self.height) else {
            return false;
        };
        let src_stride = area.width();
        let cols = clip.width();
        let skip = (clip.x1 - area.x1) as usize;
        let stride = self.width as usize;

        for y in clip.y1..=clip.y2 {
            let start = (y - area.y1) as usize * src_stride + skip;
            let Some(row) = src.get(start..start + cols) else {
                tracing::trace!(?area, len = src.len(), "source buffer shorter than area");
                break;
            };
            let offset = y as usize * stride + clip.x1 as usize;
            copy_row(&mut self.pixels[offset..offset + cols], row);
        }
        true
    }

    /// Copy a rendered area and acknowledge the flush
    ///
    /// Areas entirely off screen are skipped. The completion fires on every
    /// path.
    pub fn flush<C: PixelColor + Pod>(&mut self, area: &Area, pixels: &[C], done: FlushCompletion<'_>) {
        if area.is_outside(self.width, self.height) {
            done.complete();
            return;
        }
        if self.blit(area, pixels) {
            self.mark_dirty();
        }
        done.complete();
    }

    /// Fill the on-screen part of `area` with one color
    pub fn fill<C: PixelColor>(&mut self, area: &Area, color: C) {
        let Some(clip) = area.clamp_to(self.width, self.height) else {
            return;
        };
        let argb = color.to_argb32();
        let stride = self.width as usize;
        for y in clip.y1..=clip.y2 {
            let offset = y as usize * stride;
            self.pixels[offset + clip.x1 as usize..=offset + clip.x2 as usize].fill(argb);
        }
        self.mark_dirty();
    }

    /// Copy a color map into the on-screen part of `area`
    pub fn map<C: PixelColor + Pod>(&mut self, area: &Area, pixels: &[C]) {
        if self.blit(area, pixels) {
            self.mark_dirty();
        }
    }
}
