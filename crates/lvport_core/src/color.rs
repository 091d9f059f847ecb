//! Pixel formats handed over by the engine
//!
//! The engine renders in its compile-time color depth. Drivers only need to
//! know how to turn one pixel into the 32-bit ARGB value the desktop surface
//! and the framebuffer store, and whether a row can be copied verbatim.

use bytemuck::{Pod, Zeroable};

/// A pixel the engine can hand to a flush callback
pub trait PixelColor: Copy + Default + PartialEq + Send + Sync + 'static {
    /// Bytes per pixel in the engine buffer
    const SIZE: usize;

    /// True when the in-memory layout already is ARGB8888, so rows can be
    /// copied without per-pixel conversion
    const IS_ARGB8888: bool;

    /// Convert to a packed `0xAARRGGBB` value
    fn to_argb32(self) -> u32;

    /// Build from a packed `0xAARRGGBB` value
    fn from_argb32(argb: u32) -> Self;
}

/// 32-bit ARGB pixel (`0xAARRGGBB`)
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Argb8888(pub u32);

impl Argb8888 {
    pub const BLACK: Self = Self(0xFF00_0000);
    pub const WHITE: Self = Self(0xFFFF_FFFF);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }
}

impl PixelColor for Argb8888 {
    const SIZE: usize = 4;
    const IS_ARGB8888: bool = true;

    #[inline]
    fn to_argb32(self) -> u32 {
        self.0
    }

    #[inline]
    fn from_argb32(argb: u32) -> Self {
        Self(argb)
    }
}

/// 16-bit RGB565 pixel, the usual depth on MCU panels
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3))
    }
}

impl PixelColor for Rgb565 {
    const SIZE: usize = 2;
    const IS_ARGB8888: bool = false;

    fn to_argb32(self) -> u32 {
        let r5 = ((self.0 >> 11) & 0x1F) as u32;
        let g6 = ((self.0 >> 5) & 0x3F) as u32;
        let b5 = (self.0 & 0x1F) as u32;
        // Replicate the high bits into the low bits so full intensity maps to 0xFF
        let r = (r5 << 3) | (r5 >> 2);
        let g = (g6 << 2) | (g6 >> 4);
        let b = (b5 << 3) | (b5 >> 2);
        0xFF00_0000 | (r << 16) | (g << 8) | b
    }

    fn from_argb32(argb: u32) -> Self {
        Self::from_rgb((argb >> 16) as u8, (argb >> 8) as u8, argb as u8)
    }
}

/// Layer opacity, 0 (transparent) to 255 (cover)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Opacity(pub u8);

impl Opacity {
    pub const TRANSP: Self = Self(0);
    pub const COVER: Self = Self(255);
}

impl Default for Opacity {
    fn default() -> Self {
        Self::COVER
    }
}

/// Mix `fg` over `bg` with the given opacity, channel by channel
pub fn blend<C: PixelColor>(fg: C, bg: C, opa: Opacity) -> C {
    match opa {
        Opacity::COVER => return fg,
        Opacity::TRANSP => return bg,
        _ => {}
    }
    let fg = fg.to_argb32();
    let bg = bg.to_argb32();
    let a = opa.0 as u32;
    let mix = |shift: u32| {
        let f = (fg >> shift) & 0xFF;
        let b = (bg >> shift) & 0xFF;
        ((f * a + b * (255 - a)) / 255) << shift
    };
    C::from_argb32(0xFF00_0000 | mix(16) | mix(8) | mix(0))
}
