//! Driver lifecycle
//!
//! Each platform driver is brought up once with a [`DriverConfig`] and torn
//! down once. `init` on a running driver and `deinit` on a stopped one are
//! no-ops.
//!
//! - [`SdlDriver`]: desktop simulator window, input translation, tick thread
//! - [`LcdDriver`]: DMA2D framebuffer behind an LTDC panel, tick advanced in
//!   the task handler
//! - [`TsDriver`]: touch screen panel
//! - [`TickDriver`]: bare tick timer for targets whose display driver lives
//!   elsewhere

use std::collections::VecDeque;
use std::sync::Arc;

use bytemuck::Pod;
use lvport_core::{
    Area, DriverConfig, FlushCompletion, Opacity, PixelColor, PortError, Result, TickSink,
};
use lvport_display::{Dma2d, Dma2dDisplay, LayerConfig, MemorySurface, Monitor, PanelTiming, Surface};
use lvport_input::{
    EventSource, EventTranslator, InputState, KeyboardReader, NativeEvent, PointerReader,
    QuitFlag, TouchPanel, TouchSensor, WheelReader,
};
use parking_lot::Mutex;

use crate::scheduler::MainScheduler;
use crate::tick::{TickPolicy, TickThread};

/// Tick quantum of the LCD soft timer
pub const LCD_TICK_MS: u32 = 30;

/// A driver with an explicit init/deinit lifecycle
pub trait Driver {
    /// Bring the driver up. Calling it on a running driver does nothing.
    fn init(&mut self, config: &DriverConfig) -> Result<()>;

    /// Tear the driver down. Calling it on a stopped driver does nothing.
    fn deinit(&mut self);

    fn is_initialized(&self) -> bool;
}

/// Window system a simulator driver runs on
///
/// The SDL2 backend lives in the `lvport_sdl` crate; [`HeadlessBackend`]
/// runs without a window.
pub trait PlatformBackend {
    type Surface: Surface;
    type Events: EventSource;

    /// Create the window, renderer and texture
    fn open(&mut self, config: &DriverConfig) -> Result<(Self::Surface, Self::Events)>;

    /// Called after the surface and event source were dropped
    fn close(&mut self) {}
}

// ============================================================================
// SDL simulator
// ============================================================================

struct Running<S, E> {
    monitor: Monitor<S>,
    events: E,
    translator: EventTranslator,
    tick: Option<TickThread>,
}

/// Desktop simulator driver
///
/// Owns the window surface, translates window events into input state and,
/// with `auto_refresh`, runs a tick thread that schedules the engine's task
/// handler on the [`MainScheduler`]. The main loop calls
/// [`refresh`](Self::refresh) and [`MainScheduler::run_pending`].
pub struct SdlDriver<P: PlatformBackend> {
    platform: P,
    sink: Arc<dyn TickSink>,
    scheduler: MainScheduler,
    quit: QuitFlag,
    config: DriverConfig,
    running: Option<Running<P::Surface, P::Events>>,
}

impl<P: PlatformBackend> SdlDriver<P> {
    pub fn new(platform: P, sink: Arc<dyn TickSink>, scheduler: MainScheduler) -> Self {
        Self::with_config(platform, sink, scheduler, DriverConfig::default())
    }

    /// Create a driver whose script-level `init` starts from `config`
    ///
    /// Arguments passed to `init` override the matching fields; everything
    /// else (title, tick rate, keyboard capacity, wheel convention) comes
    /// from `config`.
    pub fn with_config(
        platform: P,
        sink: Arc<dyn TickSink>,
        scheduler: MainScheduler,
        config: DriverConfig,
    ) -> Self {
        Self {
            platform,
            sink,
            scheduler,
            quit: QuitFlag::new(),
            config,
            running: None,
        }
    }

    /// Base configuration, or the configuration of the current (or last) run
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn quit_flag(&self) -> &QuitFlag {
        &self.quit
    }

    pub fn scheduler(&self) -> &MainScheduler {
        &self.scheduler
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn monitor(&self) -> Option<&Monitor<P::Surface>> {
        self.running.as_ref().map(|r| &r.monitor)
    }

    /// Input state shared with the read adapters
    pub fn input(&self) -> Result<Arc<InputState>> {
        self.running
            .as_ref()
            .map(|r| r.translator.input())
            .ok_or(PortError::NotInitialized("SDL"))
    }

    pub fn pointer_reader(&self) -> Result<PointerReader> {
        self.input().map(PointerReader::new)
    }

    pub fn wheel_reader(&self) -> Result<WheelReader> {
        self.input().map(WheelReader::new)
    }

    pub fn keyboard_reader(&self) -> Result<KeyboardReader> {
        self.input().map(KeyboardReader::new)
    }

    /// Whether the tick thread is running
    pub fn is_ticking(&self) -> bool {
        self.running
            .as_ref()
            .and_then(|r| r.tick.as_ref())
            .is_some_and(TickThread::is_running)
    }

    /// Display flush callback; acknowledges even when not running
    pub fn flush<C: PixelColor + Pod>(&mut self, area: &Area, pixels: &[C], done: FlushCompletion<'_>) {
        match self.running.as_mut() {
            Some(running) => running.monitor.flush(area, pixels, done),
            None => done.complete(),
        }
    }

    pub fn fill<C: PixelColor>(&mut self, area: &Area, color: C) {
        if let Some(running) = self.running.as_mut() {
            running.monitor.fill(area, color);
        }
    }

    pub fn map<C: PixelColor + Pod>(&mut self, area: &Area, pixels: &[C]) {
        if let Some(running) = self.running.as_mut() {
            running.monitor.map(area, pixels);
        }
    }

    /// One main-loop step
    ///
    /// Presents the frame if it changed, drains window events and tears the
    /// driver down when a quit was requested. Returns whether the driver is
    /// still running.
    pub fn refresh(&mut self) -> Result<bool> {
        let Some(running) = self.running.as_mut() else {
            return Ok(false);
        };

        running.monitor.refresh()?;
        let summary = running.translator.pump(&mut running.events);
        if summary.expose {
            running.monitor.expose()?;
        }

        if self.quit.is_requested() {
            tracing::info!("Quit requested, shutting down simulator");
            self.deinit();
            return Ok(false);
        }
        Ok(true)
    }
}

impl<P: PlatformBackend> Driver for SdlDriver<P> {
    fn init(&mut self, config: &DriverConfig) -> Result<()> {
        if self.running.is_some() {
            tracing::debug!("SDL driver already initialized");
            return Ok(());
        }
        config.validate()?;

        self.quit.clear();
        let (surface, events) = self.platform.open(config)?;
        let monitor = Monitor::new(config.width, config.height, surface);
        let translator = EventTranslator::new(config, self.quit.clone());

        let tick = if config.auto_refresh {
            let spawned = TickThread::spawn(
                config.tick_rate_ms,
                TickPolicy::OnTimer,
                Arc::clone(&self.sink),
                self.scheduler.clone(),
                self.quit.as_atomic(),
            );
            match spawned {
                Ok(tick) => Some(tick),
                Err(e) => {
                    drop((monitor, events));
                    self.platform.close();
                    return Err(e);
                }
            }
        } else {
            None
        };

        self.config = config.clone();
        self.running = Some(Running {
            monitor,
            events,
            translator,
            tick,
        });
        tracing::info!(
            width = config.width,
            height = config.height,
            zoom = config.zoom,
            auto_refresh = config.auto_refresh,
            "SDL driver initialized"
        );
        Ok(())
    }

    fn deinit(&mut self) {
        let Some(mut running) = self.running.take() else {
            return;
        };
        self.quit.request();
        if let Some(mut tick) = running.tick.take() {
            tick.stop();
        }
        drop(running);
        self.platform.close();
        tracing::info!("SDL driver deinitialized");
    }

    fn is_initialized(&self) -> bool {
        self.running.is_some()
    }
}

impl<P: PlatformBackend> Drop for SdlDriver<P> {
    fn drop(&mut self) {
        self.deinit();
    }
}

/// Event queue shared between a [`HeadlessBackend`] and its producers
pub type EventQueue = Arc<Mutex<VecDeque<NativeEvent>>>;

/// Platform without a window
///
/// Frames land in a [`MemorySurface`]; events are whatever was pushed onto
/// the shared queue.
#[derive(Clone, Debug, Default)]
pub struct HeadlessBackend {
    events: EventQueue,
    opened: usize,
    closed: usize,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next refresh
    pub fn push_event(&self, event: NativeEvent) {
        self.events.lock().push_back(event);
    }

    pub fn event_queue(&self) -> EventQueue {
        Arc::clone(&self.events)
    }

    pub fn opened(&self) -> usize {
        self.opened
    }

    pub fn closed(&self) -> usize {
        self.closed
    }
}

/// Event source reading a [`HeadlessBackend`] queue
#[derive(Debug)]
pub struct HeadlessEvents(EventQueue);

impl EventSource for HeadlessEvents {
    fn poll_event(&mut self) -> Option<NativeEvent> {
        self.0.lock().pop_front()
    }
}

impl PlatformBackend for HeadlessBackend {
    type Surface = MemorySurface;
    type Events = HeadlessEvents;

    fn open(&mut self, _config: &DriverConfig) -> Result<(MemorySurface, HeadlessEvents)> {
        self.opened += 1;
        Ok((MemorySurface::new(), HeadlessEvents(Arc::clone(&self.events))))
    }

    fn close(&mut self) {
        self.closed += 1;
    }
}

// ============================================================================
// LCD (DMA2D + LTDC)
// ============================================================================

/// Display driver for a DMA2D framebuffer scanned out by an LTDC panel
///
/// The tick runs on a soft timer that only schedules the task handler; the
/// engine clock advances by [`LCD_TICK_MS`] right before each run.
pub struct LcdDriver<C, D> {
    dma: Option<D>,
    display: Option<Dma2dDisplay<C, D>>,
    panel: PanelTiming,
    layer: Option<LayerConfig>,
    sink: Arc<dyn TickSink>,
    scheduler: MainScheduler,
    quit: QuitFlag,
    tick: Option<TickThread>,
}

impl<C: PixelColor, D: Dma2d<C>> LcdDriver<C, D> {
    pub fn new(dma: D, panel: PanelTiming, sink: Arc<dyn TickSink>, scheduler: MainScheduler) -> Self {
        Self {
            dma: Some(dma),
            display: None,
            panel,
            layer: None,
            sink,
            scheduler,
            quit: QuitFlag::new(),
            tick: None,
        }
    }

    /// Config matching the attached panel
    pub fn panel_config(&self) -> DriverConfig {
        DriverConfig::new()
            .size(self.panel.width as u32, self.panel.height as u32)
            .tick_rate_ms(LCD_TICK_MS)
    }

    pub fn panel(&self) -> &PanelTiming {
        &self.panel
    }

    /// Layer programmed at init
    pub fn layer(&self) -> Option<&LayerConfig> {
        self.layer.as_ref()
    }

    pub fn display(&self) -> Option<&Dma2dDisplay<C, D>> {
        self.display.as_ref()
    }

    pub fn display_mut(&mut self) -> Option<&mut Dma2dDisplay<C, D>> {
        self.display.as_mut()
    }

    /// Display flush callback; acknowledges even when not running
    pub fn flush(&mut self, area: &Area, pixels: &[C], done: FlushCompletion<'_>) {
        match self.display.as_mut() {
            Some(display) => display.flush(area, pixels, done),
            None => done.complete(),
        }
    }

    pub fn gpu_blend(&mut self, dest: &mut [C], src: &[C], opa: Opacity) {
        if let Some(display) = self.display.as_mut() {
            display.gpu_blend(dest, src, opa);
        }
    }

    pub fn gpu_fill(&mut self, dest: &mut [C], dest_width: u32, area: &Area, color: C) {
        if let Some(display) = self.display.as_mut() {
            display.gpu_fill(dest, dest_width, area, color);
        }
    }
}

impl<C: PixelColor, D: Dma2d<C>> Driver for LcdDriver<C, D> {
    fn init(&mut self, config: &DriverConfig) -> Result<()> {
        if self.display.is_some() {
            tracing::debug!("LCD driver already initialized");
            return Ok(());
        }
        config.validate()?;
        let Some(dma) = self.dma.take() else {
            return Err(PortError::NotInitialized("DMA2D"));
        };

        let layer = LayerConfig::full_window::<C>(config.width, config.height);
        tracing::debug!(
            bytes = layer.framebuffer_bytes::<C>(),
            timing = ?self.panel.controller(),
            "LTDC layer configured"
        );

        self.quit.clear();
        self.scheduler
            .set_handler_tick(Arc::clone(&self.sink), config.tick_rate_ms);
        let tick = TickThread::spawn(
            config.tick_rate_ms,
            TickPolicy::InHandler,
            Arc::clone(&self.sink),
            self.scheduler.clone(),
            self.quit.as_atomic(),
        );
        match tick {
            Ok(tick) => self.tick = Some(tick),
            Err(e) => tracing::error!("LCD tick timer failed to start: {}", e),
        }

        self.display = Some(Dma2dDisplay::new(config.width, config.height, dma));
        self.layer = Some(layer);
        tracing::info!(width = config.width, height = config.height, "LCD driver initialized");
        Ok(())
    }

    fn deinit(&mut self) {
        let Some(mut display) = self.display.take() else {
            return;
        };
        self.quit.request();
        if let Some(mut tick) = self.tick.take() {
            tick.stop();
        }
        self.scheduler.clear_handler_tick();
        display.deinit();
        self.dma = Some(display.into_dma());
        self.layer = None;
        tracing::info!("LCD driver deinitialized");
    }

    fn is_initialized(&self) -> bool {
        self.display.is_some()
    }
}

// ============================================================================
// Touch screen
// ============================================================================

/// Touch screen driver
///
/// A sensor that fails to initialise leaves the driver running in a
/// degraded state: reads report released.
pub struct TsDriver<S> {
    panel: TouchPanel<S>,
    initialized: bool,
}

impl<S: TouchSensor> TsDriver<S> {
    pub fn new(sensor: S) -> Self {
        Self {
            panel: TouchPanel::new(sensor),
            initialized: false,
        }
    }

    pub fn panel(&self) -> &TouchPanel<S> {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut TouchPanel<S> {
        &mut self.panel
    }
}

impl<S: TouchSensor> Driver for TsDriver<S> {
    fn init(&mut self, config: &DriverConfig) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        config.validate()?;
        self.panel.init(config.width, config.height);
        self.initialized = true;
        Ok(())
    }

    fn deinit(&mut self) {
        if !self.initialized {
            return;
        }
        self.panel.deinit();
        self.initialized = false;
        tracing::debug!("Touch screen deinitialized");
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

// ============================================================================
// Tick timer
// ============================================================================

/// Periodic timer advancing the engine clock and scheduling the handler
///
/// For targets whose display and input drivers are plain script objects
/// and only need the engine kept running.
pub struct TickDriver {
    sink: Arc<dyn TickSink>,
    scheduler: MainScheduler,
    quit: QuitFlag,
    tick: Option<TickThread>,
}

impl TickDriver {
    pub fn new(sink: Arc<dyn TickSink>, scheduler: MainScheduler) -> Self {
        Self {
            sink,
            scheduler,
            quit: QuitFlag::new(),
            tick: None,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.tick.as_ref().map_or(0, TickThread::ticks)
    }
}

impl Driver for TickDriver {
    fn init(&mut self, config: &DriverConfig) -> Result<()> {
        if self.tick.is_some() {
            return Ok(());
        }
        config.validate()?;
        self.quit.clear();
        self.tick = Some(TickThread::spawn(
            config.tick_rate_ms,
            TickPolicy::OnTimer,
            Arc::clone(&self.sink),
            self.scheduler.clone(),
            self.quit.as_atomic(),
        )?);
        tracing::debug!(tick_rate_ms = config.tick_rate_ms, "Tick timer started");
        Ok(())
    }

    fn deinit(&mut self) {
        if let Some(mut tick) = self.tick.take() {
            self.quit.request();
            tick.stop();
            tracing::debug!("Tick timer stopped");
        }
    }

    fn is_initialized(&self) -> bool {
        self.tick.is_some()
    }
}
