//! Driver callbacks passed through scripts
//!
//! Scripts wire drivers to the engine by handing driver callbacks to
//! engine setters, e.g. `disp_drv.flush_cb = SDL.monitor_flush`. The
//! script never needs to call these, only pass them along, so each one is
//! exposed as an opaque named token that the driver layer resolves back to
//! the real callback.

use std::fmt;

/// What a driver callback does for the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallbackRole {
    /// Display flush callback
    Flush,
    /// Hardware-accelerated blend hook
    GpuBlend,
    /// Hardware-accelerated fill hook
    GpuFill,
    /// Input device read callback
    Read,
}

/// Opaque token naming one native driver callback
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PtrObject {
    SdlMonitorFlush,
    SdlMouseRead,
    SdlMouseWheelRead,
    SdlKeyboardRead,
    LcdFlush,
    LcdGpuBlend,
    LcdGpuFill,
    TsRead,
    IndevRead,
}

impl PtrObject {
    pub const ALL: [PtrObject; 9] = [
        PtrObject::SdlMonitorFlush,
        PtrObject::SdlMouseRead,
        PtrObject::SdlMouseWheelRead,
        PtrObject::SdlKeyboardRead,
        PtrObject::LcdFlush,
        PtrObject::LcdGpuBlend,
        PtrObject::LcdGpuFill,
        PtrObject::TsRead,
        PtrObject::IndevRead,
    ];

    /// Module the token is exposed in
    pub fn namespace(self) -> &'static str {
        match self {
            PtrObject::SdlMonitorFlush
            | PtrObject::SdlMouseRead
            | PtrObject::SdlMouseWheelRead
            | PtrObject::SdlKeyboardRead => "SDL",
            PtrObject::LcdFlush | PtrObject::LcdGpuBlend | PtrObject::LcdGpuFill => "lcd",
            PtrObject::TsRead => "ts",
            PtrObject::IndevRead => "indev",
        }
    }

    /// Attribute name inside the module
    pub fn name(self) -> &'static str {
        match self {
            PtrObject::SdlMonitorFlush => "monitor_flush",
            PtrObject::SdlMouseRead => "mouse_read",
            PtrObject::SdlMouseWheelRead => "mousewheel_read",
            PtrObject::SdlKeyboardRead => "keyboard_read",
            PtrObject::LcdFlush => "flush",
            PtrObject::LcdGpuBlend => "gpu_blend",
            PtrObject::LcdGpuFill => "gpu_fill",
            PtrObject::TsRead | PtrObject::IndevRead => "read",
        }
    }

    pub fn role(self) -> CallbackRole {
        match self {
            PtrObject::SdlMonitorFlush | PtrObject::LcdFlush => CallbackRole::Flush,
            PtrObject::LcdGpuBlend => CallbackRole::GpuBlend,
            PtrObject::LcdGpuFill => CallbackRole::GpuFill,
            PtrObject::SdlMouseRead
            | PtrObject::SdlMouseWheelRead
            | PtrObject::SdlKeyboardRead
            | PtrObject::TsRead
            | PtrObject::IndevRead => CallbackRole::Read,
        }
    }

    /// Look a token up by module and attribute name
    pub fn lookup(namespace: &str, name: &str) -> Option<PtrObject> {
        Self::ALL
            .into_iter()
            .find(|p| p.namespace() == namespace && p.name() == name)
    }
}

impl fmt::Display for PtrObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_every_token() {
        for ptr in PtrObject::ALL {
            assert_eq!(PtrObject::lookup(ptr.namespace(), ptr.name()), Some(ptr));
        }
        assert_eq!(PtrObject::lookup("SDL", "flush"), None);
        assert_eq!(PtrObject::lookup("ts", "read"), Some(PtrObject::TsRead));
    }

    #[test]
    fn test_roles() {
        assert_eq!(PtrObject::SdlMonitorFlush.role(), CallbackRole::Flush);
        assert_eq!(PtrObject::LcdGpuFill.role(), CallbackRole::GpuFill);
        assert_eq!(PtrObject::SdlKeyboardRead.role(), CallbackRole::Read);
    }
}
