//! LCD-TFT controller timing and layer setup

use lvport_core::PixelColor;

/// Raw panel timing as given in a panel datasheet
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelTiming {
    pub width: u16,
    pub height: u16,
    pub hsync: u16,
    pub hbp: u16,
    pub hfp: u16,
    pub vsync: u16,
    pub vbp: u16,
    pub vfp: u16,
    /// Pixel clock divider applied to the PLL output
    pub frequency_divider: u8,
}

/// Accumulated values as programmed into the controller registers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerTiming {
    pub horizontal_sync: u16,
    pub vertical_sync: u16,
    pub accumulated_hbp: u16,
    pub accumulated_vbp: u16,
    pub accumulated_active_w: u16,
    pub accumulated_active_h: u16,
    pub total_width: u16,
    pub total_height: u16,
}

impl PanelTiming {
    /// Rocktech RK043FN48H, the 4.3" panel on STM32F746G discovery boards
    pub const RK043FN48H: PanelTiming = PanelTiming {
        width: 480,
        height: 272,
        hsync: 41,
        hbp: 13,
        hfp: 32,
        vsync: 10,
        vbp: 2,
        vfp: 2,
        frequency_divider: 5,
    };

    pub const fn controller(&self) -> ControllerTiming {
        ControllerTiming {
            horizontal_sync: self.hsync - 1,
            vertical_sync: self.vsync - 1,
            accumulated_hbp: self.hsync + self.hbp - 1,
            accumulated_vbp: self.vsync + self.vbp - 1,
            accumulated_active_w: self.width + self.hsync + self.hbp - 1,
            accumulated_active_h: self.height + self.vsync + self.vbp - 1,
            total_width: self.width + self.hsync + self.hbp + self.hfp - 1,
            total_height: self.height + self.vsync + self.vbp + self.vfp - 1,
        }
    }
}

/// Layer pixel format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerFormat {
    Argb8888,
    Rgb565,
}

impl LayerFormat {
    /// Format matching the engine's color type
    pub fn for_color<C: PixelColor>() -> Self {
        if C::SIZE == 4 {
            LayerFormat::Argb8888
        } else {
            LayerFormat::Rgb565
        }
    }
}

/// One controller layer showing a framebuffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerConfig {
    pub window_x0: u32,
    pub window_x1: u32,
    pub window_y0: u32,
    pub window_y1: u32,
    pub format: LayerFormat,
    pub alpha: u8,
    pub image_width: u32,
    pub image_height: u32,
}

impl LayerConfig {
    /// Full-window opaque layer over a `width` x `height` framebuffer
    pub fn full_window<C: PixelColor>(width: u32, height: u32) -> Self {
        Self {
            window_x0: 0,
            window_x1: width,
            window_y0: 0,
            window_y1: height,
            format: LayerFormat::for_color::<C>(),
            alpha: 255,
            image_width: width,
            image_height: height,
        }
    }

    /// Framebuffer size in bytes
    pub fn framebuffer_bytes<C: PixelColor>(&self) -> usize {
        self.image_width as usize * self.image_height as usize * C::SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvport_core::{Argb8888, Rgb565};

    #[test]
    fn test_rk043fn48h_accumulated_values() {
        let t = PanelTiming::RK043FN48H.controller();
        assert_eq!(t.horizontal_sync, 40);
        assert_eq!(t.vertical_sync, 9);
        assert_eq!(t.accumulated_hbp, 53);
        assert_eq!(t.accumulated_vbp, 11);
        assert_eq!(t.accumulated_active_w, 533);
        assert_eq!(t.accumulated_active_h, 283);
        assert_eq!(t.total_width, 565);
        assert_eq!(t.total_height, 285);
    }

    #[test]
    fn test_layer_format_follows_color_size() {
        let layer = LayerConfig::full_window::<Rgb565>(480, 272);
        assert_eq!(layer.format, LayerFormat::Rgb565);
        assert_eq!(layer.framebuffer_bytes::<Rgb565>(), 480 * 272 * 2);
        assert_eq!(LayerFormat::for_color::<Argb8888>(), LayerFormat::Argb8888);
    }
}
