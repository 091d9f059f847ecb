//! lvport simulator
//!
//! Opens the SDL window through the script binding surface and runs a small
//! paint demo: the pointer draws while pressed, the wheel changes the brush
//! and Escape clears the canvas.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use lvport_core::{
    Area, Argb8888, ControlKey, DriverConfig, FlushCompletion, IndevData, TaskHandler, TickSink,
};
use lvport_runtime::binding::{standard_table, MemoryBackend, PtrObject, ScriptValue, Session};
use lvport_runtime::{logging, MainScheduler, SdlDriver};
use lvport_sdl::SdlBackend;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "lvport-sim")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Desktop simulator for lvport displays", long_about = None)]
struct Cli {
    /// Framebuffer width
    #[arg(long)]
    width: Option<u32>,

    /// Framebuffer height
    #[arg(long)]
    height: Option<u32>,

    /// Window magnification
    #[arg(short, long)]
    zoom: Option<f32>,

    /// Open the window fullscreen
    #[arg(short, long)]
    fullscreen: bool,

    /// Driver configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Engine clock advanced by the tick thread
#[derive(Default)]
struct Clock {
    ms: AtomicU64,
}

impl TickSink for Clock {
    fn tick_inc(&self, ms: u32) {
        self.ms.fetch_add(ms as u64, Ordering::Relaxed);
    }
}

const BRUSHES: [Argb8888; 4] = [
    Argb8888::from_rgb(0x21, 0x96, 0xF3),
    Argb8888::from_rgb(0xE9, 0x1E, 0x63),
    Argb8888::from_rgb(0x4C, 0xAF, 0x50),
    Argb8888::BLACK,
];

const BRUSH_SIZE: i32 = 6;

struct Paint {
    width: u32,
    height: u32,
    brush: usize,
    clear: bool,
    last_pointer: IndevData,
}

/// One task-handler run against the session
struct Frame<'a> {
    paint: &'a mut Paint,
    session: &'a mut Session<MemoryBackend, Argb8888>,
}

impl Frame<'_> {
    fn flush_fill(&mut self, area: Area, color: Argb8888) {
        let pixels = vec![color; area.pixel_count()];
        let ready = || ();
        let done = FlushCompletion::new(&ready);
        if let Err(e) = self.session.flush(PtrObject::SdlMonitorFlush, &area, &pixels, done) {
            debug!("Flush skipped: {}", e);
        }
    }

    fn read_all(&mut self, ptr: PtrObject) -> Vec<IndevData> {
        let mut records = Vec::new();
        loop {
            let mut data = IndevData::default();
            match self.session.read(ptr, &mut data) {
                Ok(more) => {
                    records.push(data);
                    if !more {
                        break;
                    }
                }
                Err(e) => {
                    debug!(%ptr, "Read failed: {}", e);
                    break;
                }
            }
        }
        records
    }
}

impl TaskHandler for Frame<'_> {
    fn task_handler(&mut self) -> u32 {
        if self.paint.clear {
            self.paint.clear = false;
            self.flush_fill(Area::of_size(self.paint.width, self.paint.height), Argb8888::WHITE);
        }

        for key in self.read_all(PtrObject::SdlKeyboardRead) {
            debug!(key = key.key, pressed = key.state.is_pressed(), "Keyboard read");
            if key.state.is_pressed() && key.key == ControlKey::Esc as u32 {
                info!("Canvas cleared");
                self.paint.clear = true;
            }
        }

        if let Some(wheel) = self.read_all(PtrObject::SdlMouseWheelRead).pop() {
            if wheel.enc_diff != 0 {
                debug!(diff = wheel.enc_diff, "Wheel read");
                let step = wheel.enc_diff.rem_euclid(BRUSHES.len() as i16) as usize;
                self.paint.brush = (self.paint.brush + step) % BRUSHES.len();
                debug!(brush = self.paint.brush, "Brush changed");
            }
        }

        if let Some(pointer) = self.read_all(PtrObject::SdlMouseRead).pop() {
            if pointer.state != self.paint.last_pointer.state {
                debug!(
                    x = pointer.point.x,
                    y = pointer.point.y,
                    pressed = pointer.state.is_pressed(),
                    "Pointer read"
                );
            }
            self.paint.last_pointer = pointer;
            if pointer.state.is_pressed() {
                let (x, y) = (pointer.point.x as i32, pointer.point.y as i32);
                let area = Area::new(x, y, x + BRUSH_SIZE - 1, y + BRUSH_SIZE - 1);
                self.flush_fill(area, BRUSHES[self.paint.brush]);
            }
        }
        0
    }
}

fn load_config(cli: &Cli) -> Result<DriverConfig> {
    let mut config = match &cli.config {
        Some(path) => DriverConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => DriverConfig::default(),
    };
    let width = cli.width.unwrap_or(config.width);
    let height = cli.height.unwrap_or(config.height);
    config = config.size(width, height);
    if let Some(zoom) = cli.zoom {
        config = config.zoom(zoom);
    }
    if cli.fullscreen {
        config = config.fullscreen(true);
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(if cli.verbose { "debug" } else { "info" });

    let config = load_config(&cli)?;
    let clock = Arc::new(Clock::default());
    let scheduler = MainScheduler::default();

    let mut session: Session<MemoryBackend, Argb8888> = Session::new(MemoryBackend::new());
    session.attach(SdlDriver::with_config(
        SdlBackend::new(),
        clock.clone(),
        scheduler.clone(),
        config.clone(),
    ));

    let table = standard_table();
    table
        .call(
            &mut session,
            "SDL",
            "init",
            &[
                ScriptValue::Int(config.width as i64),
                ScriptValue::Int(config.height as i64),
                ScriptValue::Float(config.zoom as f64),
                ScriptValue::Bool(config.fullscreen),
                ScriptValue::Bool(true),
            ],
        )
        .context("SDL.init failed")?;

    let label = table.call(&mut session, "lv", "label", &[])?;
    table.call(
        &mut session,
        "label",
        "set_text",
        &[label, ScriptValue::Str("lvport simulator".into())],
    )?;

    let mut paint = Paint {
        width: config.width,
        height: config.height,
        brush: 0,
        clear: true,
        last_pointer: IndevData::default(),
    };

    info!("Simulator running, close the window to quit");
    while session.refresh()? {
        let mut frame = Frame {
            paint: &mut paint,
            session: &mut session,
        };
        if scheduler.run_pending(&mut frame) == 0 {
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    session.shutdown();
    info!(uptime_ms = clock.ms.load(Ordering::Relaxed), "Simulator stopped");
    Ok(())
}
