//! SDL window and renderer

use lvport_core::{DriverConfig, Result};
use lvport_display::Surface;
use lvport_runtime::PlatformBackend;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::Sdl;

use crate::error::SdlError;
use crate::input::SdlEvents;

/// Window surface showing the ARGB8888 framebuffer
///
/// The window is `zoom` times the framebuffer size; the renderer scales the
/// frame up when copying it. One streaming texture is kept and recreated
/// only when the frame size changes.
pub struct SdlSurface {
    canvas: Canvas<Window>,
    creator: TextureCreator<WindowContext>,
    texture: Option<(Texture, u32, u32)>,
}

impl SdlSurface {
    fn new(canvas: Canvas<Window>) -> Self {
        let creator = canvas.texture_creator();
        Self {
            canvas,
            creator,
            texture: None,
        }
    }

    pub fn window(&self) -> &Window {
        self.canvas.window()
    }

    fn release_texture(&mut self) {
        if let Some((texture, _, _)) = self.texture.take() {
            // SAFETY: the canvas owning the renderer is still alive
            unsafe { texture.destroy() };
        }
    }

    fn texture_for(&mut self, width: u32, height: u32) -> std::result::Result<&mut Texture, SdlError> {
        let current = self.texture.as_ref().map(|(_, w, h)| (*w, *h));
        if needs_texture(current, width, height) {
            self.release_texture();
            let texture = self
                .creator
                .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
                .map_err(|e| SdlError::Render(e.to_string()))?;
            tracing::debug!(width, height, "Streaming texture created");
            self.texture = Some((texture, width, height));
        }
        match self.texture.as_mut() {
            Some((texture, _, _)) => Ok(texture),
            None => Err(SdlError::Render("texture missing".to_string())),
        }
    }
}

impl Surface for SdlSurface {
    fn present(&mut self, pixels: &[u32], width: u32, height: u32) -> Result<()> {
        self.texture_for(width, height)?
            .update(None, bytemuck::cast_slice(pixels), width as usize * 4)
            .map_err(|e| SdlError::Render(e.to_string()))?;
        self.canvas.clear();
        if let Some((texture, _, _)) = self.texture.as_ref() {
            self.canvas
                .copy(texture, None, None)
                .map_err(SdlError::Render)?;
        }
        self.canvas.present();
        Ok(())
    }
}

impl Drop for SdlSurface {
    fn drop(&mut self) {
        self.release_texture();
    }
}

/// SDL2 platform for the simulator driver
///
/// Owns the SDL context between `open` and `close`. SDL must be driven from
/// the thread that opened it.
#[derive(Default)]
pub struct SdlBackend {
    context: Option<Sdl>,
}

impl SdlBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.context.is_some()
    }

    fn open_window(&mut self, config: &DriverConfig) -> std::result::Result<(SdlSurface, SdlEvents), SdlError> {
        let sdl = sdl2::init().map_err(SdlError::Init)?;
        let video = sdl.video().map_err(SdlError::Init)?;

        let (width, height) = window_size(config);
        let mut builder = video.window(&config.title, width, height);
        builder.position_centered();
        if config.fullscreen {
            builder.fullscreen_desktop();
        }
        let window = builder
            .build()
            .map_err(|e| SdlError::Window(e.to_string()))?;

        let canvas = window
            .into_canvas()
            .build()
            .map_err(|e| SdlError::Window(e.to_string()))?;
        let pump = sdl.event_pump().map_err(SdlError::Init)?;

        tracing::info!(width, height, title = %config.title, "SDL window opened");
        self.context = Some(sdl);
        Ok((SdlSurface::new(canvas), SdlEvents::new(pump)))
    }
}

/// Whether a texture of `current` size cannot hold a `width` x `height` frame
fn needs_texture(current: Option<(u32, u32)>, width: u32, height: u32) -> bool {
    current != Some((width, height))
}

/// Window size for a framebuffer size and zoom factor
pub fn window_size(config: &DriverConfig) -> (u32, u32) {
    let scale = |v: u32| ((v as f32 * config.zoom).round() as u32).max(1);
    (scale(config.width), scale(config.height))
}

impl PlatformBackend for SdlBackend {
    type Surface = SdlSurface;
    type Events = SdlEvents;

    fn open(&mut self, config: &DriverConfig) -> Result<(SdlSurface, SdlEvents)> {
        Ok(self.open_window(config)?)
    }

    fn close(&mut self) {
        if self.context.take().is_some() {
            tracing::debug!("SDL context released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_size_applies_zoom() {
        let config = DriverConfig::new().size(480, 320).zoom(2.0);
        assert_eq!(window_size(&config), (960, 640));

        let config = DriverConfig::new().size(3, 3).zoom(0.1);
        assert_eq!(window_size(&config), (1, 1));
    }

    #[test]
    fn test_texture_reused_until_size_changes() {
        assert!(needs_texture(None, 480, 320));
        assert!(!needs_texture(Some((480, 320)), 480, 320));
        assert!(needs_texture(Some((480, 320)), 320, 480));
    }

    #[test]
    fn test_backend_starts_closed() {
        let mut backend = SdlBackend::new();
        assert!(!backend.is_open());
        backend.close();
        assert!(!backend.is_open());
    }
}
