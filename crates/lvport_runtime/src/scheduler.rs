//! Main-thread work scheduling
//!
//! Timer threads and interrupt handlers must not call into the engine or the
//! script runtime. They schedule work here instead; the thread that owns the
//! engine drains it with [`MainScheduler::run_pending`].

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_queue::ArrayQueue;
use lvport_core::{TaskHandler, TickSink};
use parking_lot::RwLock;

/// Callback type for waking up the main thread from another thread
///
/// Interrupts a main loop blocked on input so it gets to run pending work.
pub type WakeCallback = Arc<dyn Fn() + Send + Sync>;

/// One-shot job run on the main thread
pub type Job = Box<dyn FnOnce() + Send>;

/// Default number of jobs that can wait at once
pub const DEFAULT_SCHEDULER_DEPTH: usize = 8;

struct Shared {
    jobs: ArrayQueue<Job>,
    handler_pending: AtomicBool,
    wake: RwLock<Option<WakeCallback>>,
    /// Tick advanced right before each handler run
    handler_tick: RwLock<Option<(Arc<dyn TickSink>, u32)>>,
    handler_runs: AtomicU64,
    coalesced: AtomicU64,
}

/// Thread-safe queue of work for the main thread
///
/// Cheap to clone; all clones share one queue.
#[derive(Clone)]
pub struct MainScheduler {
    shared: Arc<Shared>,
}

impl Default for MainScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEDULER_DEPTH)
    }
}

impl MainScheduler {
    /// Create a scheduler holding up to `depth` jobs
    ///
    /// # Panics
    ///
    /// Panics if `depth` is zero.
    pub fn new(depth: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                jobs: ArrayQueue::new(depth),
                handler_pending: AtomicBool::new(false),
                wake: RwLock::new(None),
                handler_tick: RwLock::new(None),
                handler_runs: AtomicU64::new(0),
                coalesced: AtomicU64::new(0),
            }),
        }
    }

    /// Set the callback used to wake a blocked main loop
    pub fn set_wake_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.shared.wake.write() = Some(Arc::new(callback));
    }

    pub fn clear_wake_callback(&self) {
        *self.shared.wake.write() = None;
    }

    /// Advance the engine tick by `quantum_ms` right before every task
    /// handler run (for targets whose timer only schedules)
    pub fn set_handler_tick(&self, sink: Arc<dyn TickSink>, quantum_ms: u32) {
        *self.shared.handler_tick.write() = Some((sink, quantum_ms));
    }

    pub fn clear_handler_tick(&self) {
        *self.shared.handler_tick.write() = None;
    }

    fn wake(&self) {
        if let Some(wake) = self.shared.wake.read().as_ref() {
            wake();
        }
    }

    /// Queue a job for the main thread
    ///
    /// Returns `false` if the queue is full and the job was dropped.
    pub fn schedule<F: FnOnce() + Send + 'static>(&self, job: F) -> bool {
        if self.shared.jobs.push(Box::new(job)).is_err() {
            tracing::warn!("Main-thread scheduler queue full, dropping job");
            return false;
        }
        self.wake();
        true
    }

    /// Request one run of the engine task handler
    ///
    /// At most one run is pending at a time. Returns `false` if a run was
    /// already pending and this request was folded into it.
    pub fn schedule_task_handler(&self) -> bool {
        if self.shared.handler_pending.swap(true, Ordering::AcqRel) {
            self.shared.coalesced.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        self.wake();
        true
    }

    /// Whether a task handler run is waiting
    pub fn task_handler_pending(&self) -> bool {
        self.shared.handler_pending.load(Ordering::Acquire)
    }

    /// Whether any work is waiting
    pub fn has_pending(&self) -> bool {
        self.task_handler_pending() || !self.shared.jobs.is_empty()
    }

    /// Run all queued jobs, then the task handler if requested
    ///
    /// Must be called on the thread that owns the engine. Returns the number
    /// of jobs plus handler runs executed.
    pub fn run_pending(&self, handler: &mut dyn TaskHandler) -> usize {
        let mut ran = 0;
        while let Some(job) = self.shared.jobs.pop() {
            job();
            ran += 1;
        }

        if self.shared.handler_pending.swap(false, Ordering::AcqRel) {
            if let Some((sink, quantum)) = self.shared.handler_tick.read().as_ref() {
                sink.tick_inc(*quantum);
            }
            handler.task_handler();
            self.shared.handler_runs.fetch_add(1, Ordering::Relaxed);
            ran += 1;
        }
        ran
    }

    /// Total task handler runs so far
    pub fn handler_runs(&self) -> u64 {
        self.shared.handler_runs.load(Ordering::Relaxed)
    }

    /// Task handler requests folded into an already pending run
    pub fn coalesced(&self) -> u64 {
        self.shared.coalesced.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for MainScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainScheduler")
            .field("jobs", &self.shared.jobs.len())
            .field("handler_pending", &self.task_handler_pending())
            .field("handler_runs", &self.handler_runs())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[derive(Default)]
    struct CountingEngine {
        runs: u32,
    }

    impl TaskHandler for CountingEngine {
        fn task_handler(&mut self) -> u32 {
            self.runs += 1;
            5
        }
    }

    #[derive(Default)]
    struct TickCounter(AtomicU32);

    impl TickSink for TickCounter {
        fn tick_inc(&self, ms: u32) {
            self.0.fetch_add(ms, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_task_handler_requests_coalesce() {
        let scheduler = MainScheduler::default();
        assert!(scheduler.schedule_task_handler());
        assert!(!scheduler.schedule_task_handler());
        assert!(!scheduler.schedule_task_handler());

        let mut engine = CountingEngine::default();
        assert_eq!(scheduler.run_pending(&mut engine), 1);
        assert_eq!(engine.runs, 1);
        assert_eq!(scheduler.coalesced(), 2);

        assert_eq!(scheduler.run_pending(&mut engine), 0);
        assert!(scheduler.schedule_task_handler());
    }

    #[test]
    fn test_jobs_run_before_handler_and_queue_is_bounded() {
        let scheduler = MainScheduler::new(2);
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        for i in 0..3 {
            let order = Arc::clone(&order);
            let accepted = scheduler.schedule(move || order.lock().push(i));
            assert_eq!(accepted, i < 2);
        }
        scheduler.schedule_task_handler();

        let mut engine = CountingEngine::default();
        assert_eq!(scheduler.run_pending(&mut engine), 3);
        assert_eq!(*order.lock(), vec![0, 1]);
        assert_eq!(engine.runs, 1);
    }

    #[test]
    fn test_wake_callback_fires_on_schedule() {
        let scheduler = MainScheduler::default();
        let wakes = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&wakes);
        scheduler.set_wake_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        scheduler.schedule_task_handler();
        scheduler.schedule_task_handler();
        scheduler.schedule(|| {});
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_handler_tick_advances_before_run() {
        let scheduler = MainScheduler::default();
        let ticks = Arc::new(TickCounter::default());
        scheduler.set_handler_tick(ticks.clone(), 30);

        let mut engine = CountingEngine::default();
        scheduler.schedule_task_handler();
        scheduler.run_pending(&mut engine);
        scheduler.schedule_task_handler();
        scheduler.run_pending(&mut engine);
        assert_eq!(ticks.0.load(Ordering::SeqCst), 60);
    }
}
