//! Presenting the framebuffer on a window surface

use bytemuck::Pod;
use lvport_core::{Area, FlushCompletion, PixelColor, Result};

use crate::framebuffer::Framebuffer;

/// A visible surface the framebuffer can be blitted to
pub trait Surface {
    /// Upload the full frame and present it
    fn present(&mut self, pixels: &[u32], width: u32, height: u32) -> Result<()>;
}

/// Framebuffer plus the surface it is shown on
#[derive(Debug)]
pub struct Monitor<S> {
    framebuffer: Framebuffer,
    surface: S,
    presents: u64,
}

impl<S: Surface> Monitor<S> {
    pub fn new(width: u32, height: u32, surface: S) -> Self {
        Self {
            framebuffer: Framebuffer::new(width, height),
            surface,
            presents: 0,
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Number of frames presented so far
    pub fn presents(&self) -> u64 {
        self.presents
    }

    pub fn flush<C: PixelColor + Pod>(&mut self, area: &Area, pixels: &[C], done: FlushCompletion<'_>) {
        self.framebuffer.flush(area, pixels, done);
    }

    pub fn fill<C: PixelColor>(&mut self, area: &Area, color: C) {
        self.framebuffer.fill(area, color);
    }

    pub fn map<C: PixelColor + Pod>(&mut self, area: &Area, pixels: &[C]) {
        self.framebuffer.map(area, pixels);
    }

    fn blit(&mut self) -> Result<()> {
        let fb = &self.framebuffer;
        self.surface.present(fb.pixels(), fb.width(), fb.height())?;
        self.presents += 1;
        Ok(())
    }

    /// Present the frame if anything was drawn since the last refresh
    pub fn refresh(&mut self) -> Result<bool> {
        if !self.framebuffer.take_dirty() {
            return Ok(false);
        }
        if let Err(e) = self.blit() {
            // Keep the frame pending so the next refresh retries it
            self.framebuffer.mark_dirty();
            return Err(e);
        }
        Ok(true)
    }

    /// Present the frame unconditionally, after the window was damaged
    pub fn expose(&mut self) -> Result<()> {
        self.blit()
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

/// Surface that keeps the last presented frame in memory
#[derive(Clone, Debug, Default)]
pub struct MemorySurface {
    pub frame: Vec<u32>,
    pub width: u32,
    pub height: u32,
    pub presents: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Surface for MemorySurface {
    fn present(&mut self, pixels: &[u32], width: u32, height: u32) -> Result<()> {
        self.frame.clear();
        self.frame.extend_from_slice(pixels);
        self.width = width;
        self.height = height;
        self.presents += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvport_core::{Argb8888, PortError};

    #[test]
    fn test_refresh_presents_only_when_dirty() {
        let mut monitor = Monitor::new(4, 4, MemorySurface::new());
        assert!(monitor.refresh().unwrap());
        assert!(!monitor.refresh().unwrap());

        monitor.fill(&Area::new(0, 0, 0, 0), Argb8888::WHITE);
        assert!(monitor.refresh().unwrap());
        assert_eq!(monitor.surface().presents, 2);
        assert_eq!(monitor.surface().frame[0], Argb8888::WHITE.0);
    }

    #[test]
    fn test_expose_forces_present() {
        let mut monitor = Monitor::new(2, 2, MemorySurface::new());
        monitor.refresh().unwrap();
        monitor.expose().unwrap();
        assert_eq!(monitor.presents(), 2);
    }

    struct BrokenSurface;

    impl Surface for BrokenSurface {
        fn present(&mut self, _: &[u32], _: u32, _: u32) -> Result<()> {
            Err(PortError::Platform("texture lost".to_string()))
        }
    }

    #[test]
    fn test_present_error_propagates() {
        let mut monitor = Monitor::new(2, 2, BrokenSurface);
        assert!(monitor.refresh().is_err());
        assert_eq!(monitor.presents(), 0);
    }

    /// Fails the first `failures` presents, then behaves like memory
    struct FlakySurface {
        failures: usize,
        inner: MemorySurface,
    }

    impl Surface for FlakySurface {
        fn present(&mut self, pixels: &[u32], width: u32, height: u32) -> Result<()> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(PortError::Platform("device lost".to_string()));
            }
            self.inner.present(pixels, width, height)
        }
    }

    #[test]
    fn test_failed_present_is_retried() {
        let surface = FlakySurface {
            failures: 1,
            inner: MemorySurface::new(),
        };
        let mut monitor = Monitor::new(2, 2, surface);
        monitor.fill(&Area::new(1, 1, 1, 1), Argb8888::WHITE);

        assert!(monitor.refresh().is_err());
        assert!(monitor.framebuffer().is_dirty());

        assert!(monitor.refresh().unwrap());
        assert_eq!(monitor.surface().inner.presents, 1);
        assert_eq!(monitor.surface().inner.frame[3], Argb8888::WHITE.0);
        assert!(!monitor.refresh().unwrap());
    }
}
