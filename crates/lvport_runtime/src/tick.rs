//! Engine tick thread
//!
//! A background thread sleeps one quantum at a time, advances the engine
//! clock and schedules the task handler on the main thread. Sleeps always
//! run a little long; the overshoot is accumulated and paid back as an extra
//! quantum once it adds up to a full one.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use lvport_core::{PortError, Result, TickSink};

use crate::scheduler::MainScheduler;

/// Where the engine clock is advanced
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TickPolicy {
    /// The tick thread advances the clock itself (desktop, FreeRTOS timer)
    #[default]
    OnTimer,
    /// The tick thread only schedules; the clock is advanced right before
    /// each task handler run (MCU soft timers)
    InHandler,
}

/// Tracks accumulated oversleep of a periodic timer
#[derive(Clone, Copy, Debug)]
pub struct DriftAccumulator {
    quantum: Duration,
    acc: Duration,
}

impl DriftAccumulator {
    pub fn new(quantum: Duration) -> Self {
        Self {
            quantum,
            acc: Duration::ZERO,
        }
    }

    /// Record one period that actually lasted `elapsed`
    ///
    /// Returns how many quanta to credit: one, or two when the accumulated
    /// oversleep reached a full quantum.
    pub fn record(&mut self, elapsed: Duration) -> u32 {
        self.acc += elapsed.saturating_sub(self.quantum);
        if self.acc >= self.quantum {
            self.acc -= self.quantum;
            2
        } else {
            1
        }
    }

    /// Oversleep carried into the next period
    pub fn carried(&self) -> Duration {
        self.acc
    }
}

/// Background thread driving the engine clock
#[derive(Debug)]
pub struct TickThread {
    stop_flag: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl TickThread {
    /// Start ticking every `quantum_ms`
    ///
    /// The thread exits when [`stop`](Self::stop) is called, when the
    /// handle is dropped or when `quit` becomes set.
    pub fn spawn(
        quantum_ms: u32,
        policy: TickPolicy,
        sink: Arc<dyn TickSink>,
        scheduler: MainScheduler,
        quit: Arc<AtomicBool>,
    ) -> Result<Self> {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let ticks = Arc::new(AtomicU64::new(0));

        let thread_stop = Arc::clone(&stop_flag);
        let thread_ticks = Arc::clone(&ticks);
        let quantum = Duration::from_millis(quantum_ms as u64);

        let handle = thread::Builder::new()
            .name("lvport-tick".to_string())
            .spawn(move || {
                let mut drift = DriftAccumulator::new(quantum);
                tracing::debug!(quantum_ms, ?policy, "Tick thread started");

                while !thread_stop.load(Ordering::Relaxed) && !quit.load(Ordering::Relaxed) {
                    let start = Instant::now();
                    thread::sleep(quantum);
                    let credits = drift.record(start.elapsed());

                    if policy == TickPolicy::OnTimer {
                        for _ in 0..credits {
                            sink.tick_inc(quantum_ms);
                        }
                        thread_ticks.fetch_add(credits as u64, Ordering::Relaxed);
                    }
                    scheduler.schedule_task_handler();
                }
                tracing::debug!("Tick thread stopped");
            })
            .map_err(|e| PortError::Platform(format!("failed to spawn tick thread: {}", e)))?;

        Ok(Self {
            stop_flag,
            ticks,
            handle: Some(handle),
        })
    }

    /// Quanta credited to the engine so far
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the thread and wait for it to exit
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TickThread {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvport_core::TaskHandler;
    use std::sync::atomic::AtomicU32;

    #[derive(Default)]
    struct TickCounter(AtomicU32);

    impl TickSink for TickCounter {
        fn tick_inc(&self, ms: u32) {
            self.0.fetch_add(ms, Ordering::SeqCst);
        }
    }

    struct Noop;

    impl TaskHandler for Noop {
        fn task_handler(&mut self) -> u32 {
            0
        }
    }

    #[test]
    fn test_drift_credits_extra_quantum() {
        let q = Duration::from_millis(20);
        let mut drift = DriftAccumulator::new(q);
        assert_eq!(drift.record(Duration::from_millis(27)), 1);
        assert_eq!(drift.record(Duration::from_millis(27)), 1);
        assert_eq!(drift.carried(), Duration::from_millis(14));
        // 14 + 7 = 21 >= 20
        assert_eq!(drift.record(Duration::from_millis(27)), 2);
        assert_eq!(drift.carried(), Duration::from_millis(1));
    }

    #[test]
    fn test_early_wakeup_does_not_underflow() {
        let mut drift = DriftAccumulator::new(Duration::from_millis(20));
        assert_eq!(drift.record(Duration::from_millis(5)), 1);
        assert_eq!(drift.carried(), Duration::ZERO);
    }

    #[test]
    fn test_thread_ticks_and_schedules() {
        let sink = Arc::new(TickCounter::default());
        let scheduler = MainScheduler::default();
        let quit = Arc::new(AtomicBool::new(false));
        let mut thread =
            TickThread::spawn(1, TickPolicy::OnTimer, sink.clone(), scheduler.clone(), quit)
                .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while sink.0.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        thread.stop();

        assert!(sink.0.load(Ordering::SeqCst) >= 3);
        assert!(thread.ticks() >= 3);
        assert!(!thread.is_running());
        assert_eq!(scheduler.run_pending(&mut Noop), 1);
    }

    #[test]
    fn test_quit_flag_stops_thread() {
        let sink = Arc::new(TickCounter::default());
        let quit = Arc::new(AtomicBool::new(false));
        let thread = TickThread::spawn(
            1,
            TickPolicy::InHandler,
            sink.clone(),
            MainScheduler::default(),
            Arc::clone(&quit),
        )
        .unwrap();

        quit.store(true, Ordering::SeqCst);
        let deadline = Instant::now() + Duration::from_secs(5);
        while thread.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(!thread.is_running());
        assert_eq!(sink.0.load(Ordering::SeqCst), 0);
    }
}
