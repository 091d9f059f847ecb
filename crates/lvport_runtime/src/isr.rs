//! Interrupt-to-task handoff
//!
//! Interrupt handlers must not run script code. They push small event
//! records onto a lock-free bounded queue instead, and a normal task drains
//! the queue and runs the script callbacks.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_queue::ArrayQueue;

use crate::scheduler::WakeCallback;

/// Bounded queue from interrupt context to a normal task
///
/// One interrupt handler pushes, one task drains. Pushing never blocks or
/// allocates; a full queue hands the item back.
pub struct IsrQueue<T> {
    queue: ArrayQueue<T>,
    dropped: AtomicU64,
    wake: Option<WakeCallback>,
}

impl<T> IsrQueue<T> {
    /// Create a queue holding at most `capacity` events
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity),
            dropped: AtomicU64::new(0),
            wake: None,
        }
    }

    /// Wake the consuming task after each successful push
    pub fn with_wake<F: Fn() + Send + Sync + 'static>(mut self, wake: F) -> Self {
        self.wake = Some(Arc::new(wake));
        self
    }

    /// Enqueue from interrupt context
    ///
    /// Returns the item back when the queue is full.
    pub fn push_from_isr(&self, item: T) -> Result<(), T> {
        match self.queue.push(item) {
            Ok(()) => {
                if let Some(wake) = &self.wake {
                    wake();
                }
                Ok(())
            }
            Err(item) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Err(item)
            }
        }
    }

    /// Run `f` on every queued event, oldest first. Returns how many ran.
    pub fn drain<F: FnMut(T)>(&self, mut f: F) -> usize {
        let mut count = 0;
        while let Some(item) = self.queue.pop() {
            f(item);
            count += 1;
        }
        count
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Events rejected because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<T> fmt::Debug for IsrQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IsrQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("dropped", &self.dropped())
            .finish()
    }
}

// ============================================================================
// SPI transaction callbacks
// ============================================================================

/// Phase of an SPI transaction reported by the bus driver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpiPhase {
    Pre,
    Post,
}

/// One SPI transaction callback, recorded in interrupt context
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpiTransactionEvent {
    pub phase: SpiPhase,
    /// Caller-defined tag of the transaction (e.g. data/command line state)
    pub user: u32,
}

/// Interrupt-side hooks installed on an SPI device
///
/// Only phases with a registered task-side callback are enqueued.
pub struct SpiIsrHooks {
    queue: Arc<IsrQueue<SpiTransactionEvent>>,
    pre: bool,
    post: bool,
}

impl SpiIsrHooks {
    pub fn pre_transaction(&self, user: u32) {
        if self.pre {
            self.push(SpiPhase::Pre, user);
        }
    }

    pub fn post_transaction(&self, user: u32) {
        if self.post {
            self.push(SpiPhase::Post, user);
        }
    }

    fn push(&self, phase: SpiPhase, user: u32) {
        // Nothing can be logged from interrupt context; the consumer
        // reports the drop count instead.
        let _ = self.queue.push_from_isr(SpiTransactionEvent { phase, user });
    }
}

type SpiCallback = Box<dyn FnMut(u32) + Send>;

/// Task-side dispatcher running the callbacks for queued SPI events
pub struct SpiDispatcher {
    queue: Arc<IsrQueue<SpiTransactionEvent>>,
    pre: Option<SpiCallback>,
    post: Option<SpiCallback>,
    reported_drops: u64,
}

impl SpiDispatcher {
    /// Run the callbacks for every queued event
    pub fn dispatch(&mut self) -> usize {
        let pre = &mut self.pre;
        let post = &mut self.post;
        let ran = self.queue.drain(|event| {
            let callback = match event.phase {
                SpiPhase::Pre => pre.as_mut(),
                SpiPhase::Post => post.as_mut(),
            };
            if let Some(callback) = callback {
                callback(event.user);
            }
        });

        let dropped = self.queue.dropped();
        if dropped > self.reported_drops {
            tracing::warn!(
                dropped = dropped - self.reported_drops,
                "SPI transaction events lost, queue full"
            );
            self.reported_drops = dropped;
        }
        ran
    }
}

/// Create the interrupt hooks and task dispatcher for one SPI device
pub fn spi_transaction_callbacks(
    capacity: usize,
    pre: Option<SpiCallback>,
    post: Option<SpiCallback>,
    wake: Option<WakeCallback>,
) -> (SpiIsrHooks, SpiDispatcher) {
    let mut queue = IsrQueue::new(capacity);
    queue.wake = wake;
    let queue = Arc::new(queue);
    let hooks = SpiIsrHooks {
        queue: Arc::clone(&queue),
        pre: pre.is_some(),
        post: post.is_some(),
    };
    let dispatcher = SpiDispatcher {
        queue,
        pre,
        post,
        reported_drops: 0,
    };
    (hooks, dispatcher)
}
