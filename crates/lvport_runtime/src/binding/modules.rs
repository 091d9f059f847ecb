//! Driver modules and the script session
//!
//! A [`Session`] is the binding context: the handle arena, the engine's
//! widget backend, the attached driver modules and the input device
//! registry. [`standard_table`] builds the full script surface over it.
//!
//! Driver module functions take their parameters positionally, in the
//! order of the platform's keyword arguments:
//!
//! | Module | `init` arguments |
//! |---|---|
//! | `SDL` | `w, h, zoom, fullscreen, auto_refresh` |
//! | `lcd` | `w, h` |
//! | `ts` | `w, h` |
//! | `lvesp32` | none |
//!
//! Omitted arguments keep the driver's base configuration.

use std::collections::BTreeMap;

use bytemuck::Pod;
use lvport_core::{
    Area, Argb8888, DriverConfig, FlushCompletion, IndevData, InputDevice, Opacity, PixelColor,
};
use lvport_display::Dma2d;
use lvport_input::{InputRegistry, TouchSensor};

use super::convert::{arg, check_arity};
use super::handle::HandleArena;
use super::ptr::PtrObject;
use super::table::BindingTable;
use super::value::ScriptValue;
use super::widgets::{register_widgets, WidgetBackend, WidgetContext};
use crate::error::{BindingError, BindingResult};
use crate::lifecycle::{Driver, LcdDriver, PlatformBackend, SdlDriver, TickDriver, TsDriver};

/// A call the engine makes through a driver callback token
pub enum DriverCall<'a, 'b, C> {
    Flush {
        area: &'a Area,
        pixels: &'a [C],
        done: FlushCompletion<'b>,
    },
    GpuBlend {
        dest: &'a mut [C],
        src: &'a [C],
        opa: Opacity,
    },
    GpuFill {
        dest: &'a mut [C],
        dest_width: u32,
        area: &'a Area,
        color: C,
    },
    Read(&'a mut IndevData),
}

impl<C> DriverCall<'_, '_, C> {
    fn kind(&self) -> &'static str {
        match self {
            DriverCall::Flush { .. } => "flush",
            DriverCall::GpuBlend { .. } => "gpu_blend",
            DriverCall::GpuFill { .. } => "gpu_fill",
            DriverCall::Read(_) => "read",
        }
    }
}

fn wrong_call<C>(ptr: PtrObject, call: &DriverCall<'_, '_, C>) -> BindingError {
    BindingError::TypeMismatch {
        expected: ptr.name(),
        actual: call.kind(),
    }
}

/// A driver exposed to scripts as a module namespace
pub trait DriverModule<C>: Driver {
    fn namespace(&self) -> &'static str;

    /// Build the driver config from positional `init` arguments
    fn init_config(&self, args: &[ScriptValue]) -> BindingResult<DriverConfig>;

    /// Whether the module exposes `refresh`
    fn has_refresh(&self) -> bool {
        false
    }

    /// Main-loop step. Returns whether the driver is still running.
    fn refresh(&mut self) -> BindingResult<bool> {
        Ok(self.is_initialized())
    }

    /// Run the callback behind `ptr`
    ///
    /// Returns the "continue reading" flag for reads, `false` otherwise. A
    /// flush is acknowledged on every path, errors included.
    fn invoke(&mut self, ptr: PtrObject, call: DriverCall<'_, '_, C>) -> BindingResult<bool>;
}

fn size_args(base: DriverConfig, args: &[ScriptValue]) -> BindingResult<DriverConfig> {
    let w: Option<u32> = arg(args, 0)?;
    let h: Option<u32> = arg(args, 1)?;
    let (width, height) = (w.unwrap_or(base.width), h.unwrap_or(base.height));
    Ok(base.size(width, height))
}

impl<P, C> DriverModule<C> for SdlDriver<P>
where
    P: PlatformBackend,
    C: PixelColor + Pod,
{
    fn namespace(&self) -> &'static str {
        "SDL"
    }

    fn init_config(&self, args: &[ScriptValue]) -> BindingResult<DriverConfig> {
        check_arity("SDL.init", args, 0..=5)?;
        let mut config = size_args(self.config().clone(), args)?;
        if let Some(zoom) = arg::<Option<f32>>(args, 2)? {
            config = config.zoom(zoom);
        }
        if let Some(fullscreen) = arg::<Option<bool>>(args, 3)? {
            config = config.fullscreen(fullscreen);
        }
        if let Some(auto_refresh) = arg::<Option<bool>>(args, 4)? {
            config = config.auto_refresh(auto_refresh);
        }
        Ok(config)
    }

    fn has_refresh(&self) -> bool {
        true
    }

    fn refresh(&mut self) -> BindingResult<bool> {
        Ok(SdlDriver::refresh(self)?)
    }

    fn invoke(&mut self, ptr: PtrObject, call: DriverCall<'_, '_, C>) -> BindingResult<bool> {
        match (ptr, call) {
            (PtrObject::SdlMonitorFlush, DriverCall::Flush { area, pixels, done }) => {
                self.flush(area, pixels, done);
                Ok(false)
            }
            (PtrObject::SdlMouseRead, DriverCall::Read(data)) => Ok(self.pointer_reader()?.read(data)),
            (PtrObject::SdlMouseWheelRead, DriverCall::Read(data)) => {
                Ok(self.wheel_reader()?.read(data))
            }
            (PtrObject::SdlKeyboardRead, DriverCall::Read(data)) => {
                Ok(self.keyboard_reader()?.read(data))
            }
            (ptr, call) => Err(wrong_call(ptr, &call)),
        }
    }
}

impl<C, D> DriverModule<C> for LcdDriver<C, D>
where
    C: PixelColor,
    D: Dma2d<C>,
{
    fn namespace(&self) -> &'static str {
        "lcd"
    }

    fn init_config(&self, args: &[ScriptValue]) -> BindingResult<DriverConfig> {
        check_arity("lcd.init", args, 0..=2)?;
        size_args(self.panel_config(), args)
    }

    fn invoke(&mut self, ptr: PtrObject, call: DriverCall<'_, '_, C>) -> BindingResult<bool> {
        match (ptr, call) {
            (PtrObject::LcdFlush, DriverCall::Flush { area, pixels, done }) => {
                self.flush(area, pixels, done);
            }
            (PtrObject::LcdGpuBlend, DriverCall::GpuBlend { dest, src, opa }) => {
                self.gpu_blend(dest, src, opa);
            }
            (
                PtrObject::LcdGpuFill,
                DriverCall::GpuFill {
                    dest,
                    dest_width,
                    area,
                    color,
                },
            ) => self.gpu_fill(dest, dest_width, area, color),
            (ptr, call) => return Err(wrong_call(ptr, &call)),
        }
        Ok(false)
    }
}

impl<C, S: TouchSensor> DriverModule<C> for TsDriver<S> {
    fn namespace(&self) -> &'static str {
        "ts"
    }

    fn init_config(&self, args: &[ScriptValue]) -> BindingResult<DriverConfig> {
        check_arity("ts.init", args, 0..=2)?;
        let panel = lvport_display::PanelTiming::RK043FN48H;
        size_args(
            DriverConfig::new().size(panel.width as u32, panel.height as u32),
            args,
        )
    }

    fn invoke(&mut self, ptr: PtrObject, call: DriverCall<'_, '_, C>) -> BindingResult<bool> {
        match (ptr, call) {
            (PtrObject::TsRead, DriverCall::Read(data)) => Ok(self.panel_mut().read(data)),
            (ptr, call) => Err(wrong_call(ptr, &call)),
        }
    }
}

impl<C> DriverModule<C> for TickDriver {
    fn namespace(&self) -> &'static str {
        "lvesp32"
    }

    fn init_config(&self, args: &[ScriptValue]) -> BindingResult<DriverConfig> {
        check_arity("lvesp32.init", args, 0..=0)?;
        Ok(DriverConfig::default())
    }

    fn invoke(&mut self, ptr: PtrObject, call: DriverCall<'_, '_, C>) -> BindingResult<bool> {
        Err(wrong_call(ptr, &call))
    }
}

// ============================================================================
// Session
// ============================================================================

/// Everything a script call can reach
pub struct Session<B, C = Argb8888> {
    pub arena: HandleArena,
    pub backend: B,
    /// Generic input devices, read through `indev.read`
    pub devices: InputRegistry,
    modules: BTreeMap<&'static str, Box<dyn DriverModule<C>>>,
}

impl<B: WidgetBackend, C: 'static> Session<B, C> {
    pub fn new(backend: B) -> Self {
        Self {
            arena: HandleArena::new(),
            backend,
            devices: InputRegistry::new(),
            modules: BTreeMap::new(),
        }
    }

    /// Attach a driver module, replacing (and deinitialising) any module
    /// with the same namespace
    pub fn attach<M: DriverModule<C> + 'static>(&mut self, module: M) {
        let namespace = module.namespace();
        if let Some(mut old) = self.modules.insert(namespace, Box::new(module)) {
            old.deinit();
        }
        tracing::debug!(namespace, "Driver module attached");
    }

    /// Detach a driver module, deinitialising it
    pub fn detach(&mut self, namespace: &str) -> bool {
        match self.modules.remove(namespace) {
            Some(mut module) => {
                module.deinit();
                true
            }
            None => false,
        }
    }

    pub fn module(&self, namespace: &str) -> Option<&dyn DriverModule<C>> {
        self.modules.get(namespace).map(|m| m.as_ref())
    }

    pub fn module_mut(
        &mut self,
        namespace: &str,
    ) -> BindingResult<&mut (dyn DriverModule<C> + 'static)> {
        match self.modules.get_mut(namespace) {
            Some(module) => Ok(module.as_mut()),
            None => Err(BindingError::NotFound {
                namespace: namespace.to_string(),
                name: "<driver>".to_string(),
            }),
        }
    }

    /// Run the driver callback behind a token
    pub fn invoke(&mut self, ptr: PtrObject, call: DriverCall<'_, '_, C>) -> BindingResult<bool> {
        if ptr == PtrObject::IndevRead {
            return match call {
                DriverCall::Read(data) => Ok(self.devices.read_active(data)?),
                other => Err(wrong_call(ptr, &other)),
            };
        }
        // Dropping `call` on the error path acknowledges a pending flush
        self.module_mut(ptr.namespace())?.invoke(ptr, call)
    }

    /// Poll the input device behind a read token
    pub fn read(&mut self, ptr: PtrObject, data: &mut IndevData) -> BindingResult<bool> {
        self.invoke(ptr, DriverCall::Read(data))
    }

    /// Flush through a display token
    pub fn flush(
        &mut self,
        ptr: PtrObject,
        area: &Area,
        pixels: &[C],
        done: FlushCompletion<'_>,
    ) -> BindingResult<()> {
        self.invoke(ptr, DriverCall::Flush { area, pixels, done })
            .map(|_| ())
    }

    /// Refresh every initialised module that has a main-loop step
    ///
    /// Returns whether any module is still running.
    pub fn refresh(&mut self) -> BindingResult<bool> {
        let mut running = false;
        for module in self.modules.values_mut() {
            if module.has_refresh() && module.is_initialized() {
                running |= module.refresh()?;
            }
        }
        Ok(running)
    }

    /// Deinitialise every module
    pub fn shutdown(&mut self) {
        for module in self.modules.values_mut() {
            module.deinit();
        }
    }
}

impl<B: WidgetBackend, C> WidgetContext for Session<B, C> {
    fn widgets(&mut self) -> (&mut HandleArena, &mut dyn WidgetBackend) {
        (&mut self.arena, &mut self.backend)
    }
}

fn register_module<B, C>(table: &mut BindingTable<Session<B, C>>, namespace: &'static str)
where
    B: WidgetBackend + 'static,
    C: 'static,
{
    table.register(namespace, "init", move |session: &mut Session<B, C>, args: &[ScriptValue]| {
        let module = session.module_mut(namespace)?;
        let config = module.init_config(args)?;
        module.init(&config)?;
        Ok(ScriptValue::None)
    });
    table.register(namespace, "deinit", move |session: &mut Session<B, C>, args: &[ScriptValue]| {
        check_arity("deinit", args, 0..=0)?;
        session.module_mut(namespace)?.deinit();
        Ok(ScriptValue::None)
    });
}

/// Build the full script surface: widget classes, driver modules and
/// driver callback tokens
pub fn standard_table<B, C>() -> BindingTable<Session<B, C>>
where
    B: WidgetBackend + 'static,
    C: 'static,
{
    let mut table = BindingTable::new();
    register_widgets(&mut table);

    for namespace in ["SDL", "lcd", "ts", "lvesp32"] {
        register_module(&mut table, namespace);
    }
    table.register("SDL", "refresh", |session: &mut Session<B, C>, args: &[ScriptValue]| {
        check_arity("refresh", args, 0..=0)?;
        let running = session.module_mut("SDL")?.refresh()?;
        Ok(ScriptValue::Bool(running))
    });

    for ptr in PtrObject::ALL {
        table.register_value(ptr.namespace(), ptr.name(), ScriptValue::Ptr(ptr));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::HeadlessBackend;
    use crate::scheduler::MainScheduler;
    use crate::binding::widgets::MemoryBackend;
    use lvport_core::{IndevKind, IndevState, Point, PortError, Rgb565, TickSink};
    use lvport_display::{PanelTiming, SoftDma2d};
    use lvport_input::{CallbackDevice, NativeEvent};
    use std::cell::Cell;
    use std::sync::Arc;

    struct NullTick;

    impl TickSink for NullTick {
        fn tick_inc(&self, _ms: u32) {}
    }

    fn sdl_session() -> (BindingTable<Session<MemoryBackend>>, Session<MemoryBackend>, HeadlessBackend) {
        let platform = HeadlessBackend::new();
        let mut session = Session::new(MemoryBackend::new());
        session.attach(SdlDriver::new(
            platform.clone(),
            Arc::new(NullTick),
            MainScheduler::default(),
        ));
        (standard_table(), session, platform)
    }

    #[test]
    fn test_sdl_init_from_script_arguments() {
        let (table, mut session, _) = sdl_session();
        let args = [
            ScriptValue::Int(64),
            ScriptValue::Int(32),
            ScriptValue::Float(2.0),
            ScriptValue::None,
            ScriptValue::Bool(false),
        ];
        table.call(&mut session, "SDL", "init", &args).unwrap();

        let sdl = session.module("SDL").unwrap();
        assert!(sdl.is_initialized());
        assert_eq!(
            table.call(&mut session, "SDL", "refresh", &[]),
            Ok(ScriptValue::Bool(true))
        );
        table.call(&mut session, "SDL", "deinit", &[]).unwrap();
        table.call(&mut session, "SDL", "deinit", &[]).unwrap();
        assert!(!session.module("SDL").unwrap().is_initialized());
    }

    #[test]
    fn test_sdl_init_keeps_loaded_config() {
        let loaded = DriverConfig::from_toml_str(
            "title = \"Bench\"\nwheel_convention = \"web\"\nkeyboard_capacity = 4\ntick_rate_ms = 10\n",
        )
        .unwrap();
        let platform = HeadlessBackend::new();
        let mut session: Session<MemoryBackend> = Session::new(MemoryBackend::new());
        session.attach(SdlDriver::with_config(
            platform.clone(),
            Arc::new(NullTick),
            MainScheduler::default(),
            loaded,
        ));
        let table = standard_table();
        let args = [
            ScriptValue::Int(16),
            ScriptValue::Int(8),
            ScriptValue::Float(1.0),
            ScriptValue::Bool(false),
            ScriptValue::Bool(false),
        ];
        table.call(&mut session, "SDL", "init", &args).unwrap();

        // Web convention steps one tick per event
        platform.push_event(NativeEvent::MouseWheel { y: -120 });
        platform.push_event(NativeEvent::MouseWheel { y: -120 });
        // Capacity 4 holds two press/release strokes
        platform.push_event(NativeEvent::TextInput("abc".into()));
        session.refresh().unwrap();

        let mut data = IndevData::default();
        session.read(PtrObject::SdlMouseWheelRead, &mut data).unwrap();
        assert_eq!(data.enc_diff, 2);

        let mut keys = 0;
        loop {
            let more = session.read(PtrObject::SdlKeyboardRead, &mut data).unwrap();
            keys += 1;
            if !more {
                break;
            }
        }
        assert_eq!(keys, 4);

        let config = session.module("SDL").unwrap().init_config(&args).unwrap();
        assert_eq!(config.title, "Bench");
        assert_eq!(config.tick_rate_ms, 10);
        assert_eq!((config.width, config.height), (16, 8));
    }

    #[test]
    fn test_init_argument_errors() {
        let (table, mut session, _) = sdl_session();
        assert!(matches!(
            table.call(&mut session, "SDL", "init", &[ScriptValue::Int(-1)]),
            Err(BindingError::OutOfRange { .. })
        ));
        assert!(matches!(
            table.call(&mut session, "SDL", "init", &[ScriptValue::Int(0)]),
            Err(BindingError::Driver(_))
        ));
        assert!(matches!(
            table.call(&mut session, "lcd", "init", &[]),
            Err(BindingError::NotFound { .. })
        ));
    }

    #[test]
    fn test_tokens_route_to_drivers() {
        let (table, mut session, platform) = sdl_session();
        table
            .call(
                &mut session,
                "SDL",
                "init",
                &[ScriptValue::Int(8), ScriptValue::Int(8), ScriptValue::None, ScriptValue::None, ScriptValue::Bool(false)],
            )
            .unwrap();

        let mouse = table.attr("SDL", "mouse_read").unwrap().as_ptr().unwrap();
        let keyboard = table.attr("SDL", "keyboard_read").unwrap().as_ptr().unwrap();
        let flush = table.attr("SDL", "monitor_flush").unwrap().as_ptr().unwrap();

        platform.push_event(NativeEvent::TextInput("a".into()));
        platform.push_event(NativeEvent::MouseMotion { x: 3, y: 4 });
        session.refresh().unwrap();

        let mut data = IndevData::default();
        assert!(session.read(keyboard, &mut data).unwrap());
        assert_eq!((data.key, data.state), ('a' as u32, IndevState::Pressed));
        assert!(!session.read(keyboard, &mut data).unwrap());

        session.read(mouse, &mut data).unwrap();
        assert_eq!(data.point, Point::new(3, 4));

        let count = Cell::new(0);
        let signal = || count.set(count.get() + 1);
        session
            .flush(flush, &Area::new(0, 0, 0, 0), &[Argb8888::WHITE], FlushCompletion::new(&signal))
            .unwrap();
        assert_eq!(count.get(), 1);

        // A read token used as flush target is rejected but still acknowledged
        assert!(session
            .flush(mouse, &Area::new(0, 0, 0, 0), &[Argb8888::WHITE], FlushCompletion::new(&signal))
            .is_err());
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_missing_driver_still_acknowledges_flush() {
        let mut session: Session<MemoryBackend> = Session::new(MemoryBackend::new());
        let count = Cell::new(0);
        let signal = || count.set(count.get() + 1);
        let result = session.flush(
            PtrObject::LcdFlush,
            &Area::new(0, 0, 0, 0),
            &[Argb8888::BLACK],
            FlushCompletion::new(&signal),
        );
        assert!(matches!(result, Err(BindingError::NotFound { .. })));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_lcd_module() {
        let mut session: Session<MemoryBackend, Rgb565> = Session::new(MemoryBackend::new());
        let scheduler = MainScheduler::default();
        session.attach(LcdDriver::new(
            SoftDma2d::new(),
            PanelTiming::RK043FN48H,
            Arc::new(NullTick),
            scheduler,
        ));
        let table = standard_table();
        table
            .call(&mut session, "lcd", "init", &[ScriptValue::Int(4), ScriptValue::Int(2)])
            .unwrap();

        let mut dest = [Rgb565::default(); 8];
        let color = Rgb565::from_rgb(0, 255, 0);
        session
            .invoke(
                PtrObject::LcdGpuFill,
                DriverCall::GpuFill {
                    dest: &mut dest,
                    dest_width: 4,
                    area: &Area::new(1, 0, 2, 1),
                    color,
                },
            )
            .unwrap();
        assert_eq!(dest[1], color);
        assert_eq!(dest[6], color);
        assert_eq!(dest[0], Rgb565::default());
        session.shutdown();
    }

    #[test]
    fn test_indev_read_uses_active_device() {
        let mut session: Session<MemoryBackend> = Session::new(MemoryBackend::new());
        let mut data = IndevData::default();
        assert!(matches!(
            session.read(PtrObject::IndevRead, &mut data),
            Err(BindingError::Driver(_))
        ));

        let id = session.devices.register(Box::new(CallbackDevice::new(
            IndevKind::Button,
            |data: &mut IndevData| {
                data.btn_id = 2;
                data.state = IndevState::Pressed;
                false
            },
        )));
        session.devices.activate(id).unwrap();
        session.read(PtrObject::IndevRead, &mut data).unwrap();
        assert_eq!(data.btn_id, 2);

        let err = BindingError::from(PortError::NoActiveDevice);
        session.devices.deregister(id).unwrap();
        assert_eq!(session.read(PtrObject::IndevRead, &mut data), Err(err));
    }

    #[test]
    fn test_surface_listing() {
        let table: BindingTable<Session<MemoryBackend>> = standard_table();
        assert_eq!(table.functions("SDL"), vec!["deinit", "init", "refresh"]);
        assert_eq!(table.functions("ts"), vec!["deinit", "init"]);
        assert_eq!(
            table.attr("lcd", "gpu_blend"),
            Ok(ScriptValue::Ptr(PtrObject::LcdGpuBlend))
        );
        assert!(table.namespaces().contains(&"label"));
    }
}
