//! Driver configuration
//!
//! All values are fixed when a driver is initialised and are not
//! reconfigurable afterwards. A configuration can be built in code with the
//! builder methods or loaded from TOML:
//!
//! ```toml
//! width = 800
//! height = 480
//! zoom = 2.0
//! tick_rate_ms = 20
//! wheel_convention = "web"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PortError, Result};

/// Default horizontal resolution of the simulator
pub const DEFAULT_HOR_RES: u32 = 480;
/// Default vertical resolution of the simulator
pub const DEFAULT_VER_RES: u32 = 320;
/// Size of one platform text-input event, and the keyboard queue capacity
pub const TEXT_INPUT_EVENT_SIZE: usize = 32;
/// Default tick quantum in milliseconds
pub const DEFAULT_TICK_RATE_MS: u32 = 20;

/// Sign convention for mouse-wheel motion
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelConvention {
    /// Accumulate the native delta, inverted: scrolling down turns the
    /// encoder forward
    #[default]
    Native,
    /// Browser builds report scaled deltas; step one tick per event by sign
    Web,
}

/// Driver configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Window title (simulator only)
    pub title: String,
    /// Framebuffer width in pixels
    pub width: u32,
    /// Framebuffer height in pixels
    pub height: u32,
    /// Window magnification; input coordinates are divided by it
    pub zoom: f32,
    /// Open the simulator window fullscreen
    pub fullscreen: bool,
    /// Start the tick thread at init
    pub auto_refresh: bool,
    /// Capacity of the keyboard event queue
    pub keyboard_capacity: usize,
    /// Tick quantum in milliseconds
    pub tick_rate_ms: u32,
    /// Mouse wheel sign convention
    pub wheel_convention: WheelConvention,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            title: "TFT Simulator".to_string(),
            width: DEFAULT_HOR_RES,
            height: DEFAULT_VER_RES,
            zoom: 1.0,
            fullscreen: false,
            auto_refresh: true,
            keyboard_capacity: TEXT_INPUT_EVENT_SIZE,
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            wheel_convention: WheelConvention::Native,
        }
    }
}

impl DriverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the framebuffer size
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the window title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the window magnification
    pub fn zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set whether to start fullscreen
    pub fn fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    /// Set whether init starts the tick thread
    pub fn auto_refresh(mut self, auto_refresh: bool) -> Self {
        self.auto_refresh = auto_refresh;
        self
    }

    /// Set the keyboard queue capacity
    pub fn keyboard_capacity(mut self, capacity: usize) -> Self {
        self.keyboard_capacity = capacity;
        self
    }

    /// Set the tick quantum
    pub fn tick_rate_ms(mut self, ms: u32) -> Self {
        self.tick_rate_ms = ms;
        self
    }

    /// Set the wheel sign convention
    pub fn wheel_convention(mut self, convention: WheelConvention) -> Self {
        self.wheel_convention = convention;
        self
    }

    /// Reject values no driver can work with
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PortError::InvalidConfig(format!(
                "display size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > i16::MAX as u32 || self.height > i16::MAX as u32 {
            return Err(PortError::InvalidConfig(format!(
                "display size {}x{} exceeds the engine coordinate range",
                self.width, self.height
            )));
        }
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(PortError::InvalidConfig(format!(
                "zoom must be a positive number, got {}",
                self.zoom
            )));
        }
        if self.keyboard_capacity == 0 {
            return Err(PortError::InvalidConfig(
                "keyboard capacity must be non-zero".to_string(),
            ));
        }
        if self.tick_rate_ms == 0 {
            return Err(PortError::InvalidConfig(
                "tick rate must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a TOML configuration
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: DriverConfig =
            toml::from_str(source).map_err(|e| PortError::ConfigLoad(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .map_err(|e| PortError::ConfigLoad(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("Loaded driver configuration from {}", path.display());
        Self::from_toml_str(&source)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PortError::ConfigLoad(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_simulator() {
        let config = DriverConfig::default();
        assert_eq!((config.width, config.height), (480, 320));
        assert_eq!(config.keyboard_capacity, 32);
        assert_eq!(config.tick_rate_ms, 20);
        assert!(config.auto_refresh);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DriverConfig::from_toml_str(
            r#"
            width = 800
            zoom = 2.0
            wheel_convention = "web"
            "#,
        )
        .unwrap();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 320);
        assert_eq!(config.zoom, 2.0);
        assert_eq!(config.wheel_convention, WheelConvention::Web);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(DriverConfig::new().size(0, 10).validate().is_err());
        assert!(DriverConfig::new().zoom(0.0).validate().is_err());
        assert!(DriverConfig::new().zoom(f32::NAN).validate().is_err());
        assert!(DriverConfig::new().keyboard_capacity(0).validate().is_err());
        assert!(DriverConfig::new().tick_rate_ms(0).validate().is_err());
        assert!(DriverConfig::from_toml_str("height = 0").is_err());
        assert!(DriverConfig::from_toml_str("width = \"wide\"").is_err());
    }
}
