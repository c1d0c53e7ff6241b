//! Dispatch metrics for observability
//!
//! Counters for monitoring engine health: lost events under backpressure,
//! render and writer failures, and caller-frame capture activity.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for dispatch-engine observability
///
/// All counters are relaxed atomics; they order nothing, they only count.
///
/// # Example
///
/// ```
/// use logweave::DispatchMetrics;
///
/// let metrics = DispatchMetrics::new();
/// metrics.record_lost();
/// assert_eq!(metrics.lost_events(), 1);
/// ```
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Events accepted into the queue
    enqueued: AtomicU64,

    /// Events rendered and handed to every writer
    delivered: AtomicU64,

    /// Events dropped because the timed queue insert expired
    lost_events: AtomicU64,

    /// Events dropped because an element's render step failed
    render_errors: AtomicU64,

    /// Individual writer failures (the event still reaches other writers)
    writer_errors: AtomicU64,

    /// Stack captures performed for caller-detail patterns
    caller_captures: AtomicU64,

    /// Captures where the boundary type was missing from the stack
    caller_misses: AtomicU64,
}

impl DispatchMetrics {
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            lost_events: AtomicU64::new(0),
            render_errors: AtomicU64::new(0),
            writer_errors: AtomicU64::new(0),
            caller_captures: AtomicU64::new(0),
            caller_misses: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn lost_events(&self) -> u64 {
        self.lost_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn render_errors(&self) -> u64 {
        self.render_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn writer_errors(&self) -> u64 {
        self.writer_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn caller_captures(&self) -> u64 {
        self.caller_captures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn caller_misses(&self) -> u64 {
        self.caller_misses.load(Ordering::Relaxed)
    }

    /// Record an accepted event
    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a fully delivered event
    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.delivered.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a lost event; returns the count before the increment
    #[inline]
    pub fn record_lost(&self) -> u64 {
        self.lost_events.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a render failure
    #[inline]
    pub fn record_render_error(&self) -> u64 {
        self.render_errors.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a writer failure
    #[inline]
    pub fn record_writer_error(&self) -> u64 {
        self.writer_errors.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a caller-frame stack capture
    #[inline]
    pub fn record_caller_capture(&self) -> u64 {
        self.caller_captures.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a failed caller resolution
    #[inline]
    pub fn record_caller_miss(&self) -> u64 {
        self.caller_misses.fetch_add(1, Ordering::Relaxed)
    }

    /// Lost events as a percentage of all events offered to the queue
    ///
    /// Returns 0.0 when nothing has been offered yet.
    pub fn loss_rate(&self) -> f64 {
        let lost = self.lost_events() as f64;
        let total = self.enqueued() as f64 + lost;
        if total == 0.0 {
            0.0
        } else {
            (lost / total) * 100.0
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.enqueued.store(0, Ordering::Relaxed);
        self.delivered.store(0, Ordering::Relaxed);
        self.lost_events.store(0, Ordering::Relaxed);
        self.render_errors.store(0, Ordering::Relaxed);
        self.writer_errors.store(0, Ordering::Relaxed);
        self.caller_captures.store(0, Ordering::Relaxed);
        self.caller_misses.store(0, Ordering::Relaxed);
    }
}

impl Clone for DispatchMetrics {
    /// Create a snapshot of the current counter values
    fn clone(&self) -> Self {
        Self {
            enqueued: AtomicU64::new(self.enqueued()),
            delivered: AtomicU64::new(self.delivered()),
            lost_events: AtomicU64::new(self.lost_events()),
            render_errors: AtomicU64::new(self.render_errors()),
            writer_errors: AtomicU64::new(self.writer_errors()),
            caller_captures: AtomicU64::new(self.caller_captures()),
            caller_misses: AtomicU64::new(self.caller_misses()),
        }
    }
}
