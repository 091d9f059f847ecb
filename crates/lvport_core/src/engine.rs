//! Seams to the graphics engine
//!
//! The engine itself (widget tree, renderer, timers) lives outside this
//! workspace. Drivers talk to it through these small traits, which the
//! engine bindings or a test double implement.

use std::fmt;

/// Advances the engine's logical clock
///
/// Called from the tick thread or a timer callback, so it must be callable
/// from any thread.
pub trait TickSink: Send + Sync {
    fn tick_inc(&self, ms: u32);
}

/// Runs the engine's pending work
///
/// Only ever called on the thread that owns the engine.
pub trait TaskHandler {
    /// Run timers, redraws and input scans that are due. Returns the number
    /// of milliseconds until the handler wants to run again.
    fn task_handler(&mut self) -> u32;
}

/// Tells the engine a display flush has finished
pub trait FlushReady {
    fn flush_ready(&self);
}

impl<F: Fn()> FlushReady for F {
    fn flush_ready(&self) {
        self()
    }
}

/// Guard handed to a flush routine that signals completion exactly once
///
/// The engine stalls its redraw pipeline until every flush has been
/// acknowledged. Call [`complete`](Self::complete) when the copy is done;
/// if the guard is dropped on an early-return path it signals anyway.
#[must_use = "dropping the completion signals the flush immediately"]
pub struct FlushCompletion<'a> {
    signal: &'a dyn FlushReady,
    fired: bool,
}

impl<'a> FlushCompletion<'a> {
    pub fn new(signal: &'a dyn FlushReady) -> Self {
        Self {
            signal,
            fired: false,
        }
    }

    /// Signal that the flush is finished
    pub fn complete(mut self) {
        self.fire();
    }

    fn fire(&mut self) {
        if !self.fired {
            self.fired = true;
            self.signal.flush_ready();
        }
    }
}

impl Drop for FlushCompletion<'_> {
    fn drop(&mut self) {
        self.fire();
    }
}

impl fmt::Debug for FlushCompletion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlushCompletion")
            .field("fired", &self.fired)
            .finish()
    }
}
