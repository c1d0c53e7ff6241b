//! Asynchronous dispatch engine
//!
//! Decouples producer threads from rendering and I/O. Producers offer events
//! to a bounded queue with a timed insert and are never blocked past that
//! timeout; a dedicated consumer thread dequeues in FIFO order, renders each
//! event against one complete configuration snapshot, and writes the text to
//! every sink. Stop is cooperative: draining delivers every accepted event
//! before the engine reports stopped.

use super::config::{ConfigSource, EngineConfig};
use super::error::{EngineError, Result};
use super::event::LogEvent;
use super::level::Level;
use super::lifecycle::{Refreshable, Stoppable};
use super::metrics::DispatchMetrics;
use super::writer::LogWriter;
use crate::pattern::PatternPipeline;
use crate::writers::ConsoleWriter;
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender};
use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Fallback drain window when an engine is dropped without an explicit
/// coordinated shutdown
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// A sink shared across configuration snapshots.
///
/// Only the consumer thread ever locks a writer; the mutex exists so a
/// refresh can carry the same sink into the next snapshot.
pub type SharedWriter = Arc<Mutex<Box<dyn LogWriter>>>;

/// One complete, immutable configuration: swapped whole, never mutated
pub struct ConfigSnapshot {
    min_level: Level,
    pipeline: PatternPipeline,
    writers: Vec<SharedWriter>,
}

impl ConfigSnapshot {
    pub fn min_level(&self) -> Level {
        self.min_level
    }

    pub fn pipeline(&self) -> &PatternPipeline {
        &self.pipeline
    }
}

const RUNNING: u8 = 0;
const DRAINING: u8 = 1;
const STOPPED: u8 = 2;

/// State shared with the consumer thread
struct Shared {
    snapshot: RwLock<Arc<ConfigSnapshot>>,
    metrics: DispatchMetrics,
    state: AtomicU8,
    stopped_lock: Mutex<bool>,
    stopped_cond: Condvar,
}

impl Shared {
    fn mark_stopped(&self) {
        self.state.store(STOPPED, Ordering::Release);
        let mut stopped = self.stopped_lock.lock();
        *stopped = true;
        self.stopped_cond.notify_all();
    }
}

pub struct DispatchEngine {
    shared: Arc<Shared>,
    sender: Mutex<Option<Sender<LogEvent>>>,
    consumer: Mutex<Option<thread::JoinHandle<()>>>,
    enqueue_timeout: Duration,
    source: Option<Box<dyn ConfigSource>>,
    applied_config: Mutex<EngineConfig>,
}

impl DispatchEngine {
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Offer an event to the queue.
    ///
    /// Accepted only while running. When the queue stays full for the whole
    /// enqueue timeout the event is lost, the lost-event counter increments,
    /// and a rate-limited alert goes to the diagnostic stream; the producer
    /// is never blocked beyond the timeout.
    pub fn enqueue(&self, event: LogEvent) {
        if self.shared.state.load(Ordering::Acquire) != RUNNING {
            return;
        }
        // Clone the sender out of the lock so slow inserts do not serialize
        // other producers behind this one.
        let sender = match &*self.sender.lock() {
            Some(sender) => sender.clone(),
            None => return,
        };
        match sender.send_timeout(event, self.enqueue_timeout) {
            Ok(()) => {
                self.shared.metrics.record_enqueued();
            }
            Err(SendTimeoutError::Timeout(_)) => self.record_lost_event(),
            Err(SendTimeoutError::Disconnected(_)) => {
                // Raced with shutdown; the event was not accepted.
            }
        }
    }

    fn record_lost_event(&self) {
        let lost_before = self.shared.metrics.record_lost();
        let lost = lost_before + 1;
        if lost_before == 0 || lost % 1000 == 0 {
            eprintln!(
                "[LOGWEAVE WARNING] dispatch queue full, {} events lost. \
                 Consider a larger queue or a longer enqueue timeout.",
                lost
            );
        }
    }

    /// The current configuration snapshot; holders render against it even if
    /// a refresh lands meanwhile
    pub(crate) fn snapshot(&self) -> Arc<ConfigSnapshot> {
        self.shared.snapshot.read().clone()
    }

    /// Whether an event at `level` would currently be accepted
    pub fn is_enabled(&self, level: Level) -> bool {
        level >= self.snapshot().min_level
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.shared.metrics
    }

    fn apply_config(&self, config: EngineConfig) -> Result<()> {
        let pipeline = PatternPipeline::compile(&config.pattern)?;
        {
            let mut slot = self.shared.snapshot.write();
            let writers = slot.writers.clone();
            *slot = Arc::new(ConfigSnapshot {
                min_level: config.min_level,
                pipeline,
                writers,
            });
        }
        // Queue capacity and enqueue timeout are fixed at construction; the
        // remaining fields become the base for the next override refresh.
        *self.applied_config.lock() = config;
        Ok(())
    }
}

impl Refreshable for DispatchEngine {
    fn refresh(&self) -> Result<()> {
        let source = self.source.as_ref().ok_or_else(|| {
            EngineError::config("refresh", "engine was built without a configuration source")
        })?;
        self.apply_config(source.load()?)
    }

    fn refresh_with(&self, overrides: &HashMap<String, String>) -> Result<()> {
        let config = self.applied_config.lock().with_overrides(overrides)?;
        self.apply_config(config)
    }
}

impl Stoppable for DispatchEngine {
    fn stop(&self) {
        if self
            .shared
            .state
            .compare_exchange(RUNNING, DRAINING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            // Disconnecting the channel is the drain signal: the consumer
            // keeps dequeuing until the queue is empty, then finishes.
            drop(self.sender.lock().take());
        }
    }

    fn is_stopped(&self) -> bool {
        self.shared.state.load(Ordering::Acquire) == STOPPED
    }

    fn await_stopped(&self) {
        let mut stopped = self.shared.stopped_lock.lock();
        while !*stopped {
            self.shared.stopped_cond.wait(&mut stopped);
        }
    }
}

impl Drop for DispatchEngine {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.consumer.lock().take() {
            let start = std::time::Instant::now();
            loop {
                if handle.is_finished() {
                    if let Err(e) = handle.join() {
                        eprintln!(
                            "[LOGWEAVE ERROR] consumer thread panicked during shutdown: {:?}",
                            e
                        );
                    }
                    break;
                }
                if start.elapsed() >= DEFAULT_SHUTDOWN_TIMEOUT {
                    eprintln!(
                        "[LOGWEAVE WARNING] consumer thread did not drain within {:?}. \
                         Some events may be lost.",
                        DEFAULT_SHUTDOWN_TIMEOUT
                    );
                    break;
                }
                thread::sleep(Duration::from_millis(10));
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Consumer loop: dequeue in FIFO order, render against one snapshot, write
/// to every sink, and keep going on per-event failures.
fn consume(shared: Arc<Shared>, receiver: Receiver<LogEvent>) {
    let mut buffer = String::with_capacity(256);
    // Ends once every sender is dropped and the queue is drained, which is
    // exactly the at-least-once delivery boundary for accepted events.
    for event in receiver.iter() {
        let snapshot = shared.snapshot.read().clone();

        buffer.clear();
        if let Err(e) = snapshot.pipeline.render(&event, &mut buffer) {
            shared.metrics.record_render_error();
            eprintln!("[LOGWEAVE ERROR] dropping event, render failed: {}", e);
            continue;
        }

        for writer in &snapshot.writers {
            let mut writer = writer.lock();
            // Per-writer panic isolation: one misbehaving sink must not take
            // down dispatch for the others.
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                writer.write(&buffer)
            }));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    shared.metrics.record_writer_error();
                    eprintln!("[LOGWEAVE ERROR] writer '{}' failed: {}", writer.name(), e);
                }
                Err(panic) => {
                    shared.metrics.record_writer_error();
                    eprintln!(
                        "[LOGWEAVE CRITICAL] writer '{}' panicked: {}. \
                         Other writers continue to function.",
                        writer.name(),
                        panic_message(&panic)
                    );
                }
            }
        }
        shared.metrics.record_delivered();
    }

    // Drained: release the sinks before reporting stopped.
    let snapshot = shared.snapshot.read().clone();
    for writer in &snapshot.writers {
        let mut writer = writer.lock();
        if let Err(e) = writer.flush() {
            eprintln!("[LOGWEAVE ERROR] writer '{}' flush failed: {}", writer.name(), e);
        }
        if let Err(e) = writer.close() {
            eprintln!("[LOGWEAVE ERROR] writer '{}' close failed: {}", writer.name(), e);
        }
    }
    shared.mark_stopped();
}

/// Builder for [`DispatchEngine`]
///
/// # Example
///
/// ```
/// use logweave::{DispatchEngine, Level};
/// use logweave::writers::MemoryWriter;
///
/// let sink = MemoryWriter::new();
/// let engine = DispatchEngine::builder()
///     .pattern("{level} {message-and-error}")
///     .min_level(Level::Debug)
///     .queue_capacity(256)
///     .writer(sink.clone())
///     .build()
///     .expect("engine starts");
/// # drop(engine);
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    writers: Vec<Box<dyn LogWriter>>,
    source: Option<Box<dyn ConfigSource>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            writers: Vec::new(),
            source: None,
        }
    }

    /// Start from a configuration source: load it now, keep it for
    /// [`Refreshable::refresh`]. A source that fails to load is a startup
    /// failure.
    pub fn from_source(source: impl ConfigSource + 'static) -> Result<Self> {
        let config = source
            .load()
            .map_err(|e| EngineError::startup(format!("cannot load configuration: {}", e)))?;
        Ok(Self {
            config,
            writers: Vec::new(),
            source: Some(Box::new(source)),
        })
    }

    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.pattern = pattern.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: Level) -> Self {
        self.config.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn enqueue_timeout(mut self, timeout: Duration) -> Self {
        self.config.enqueue_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Add an output sink. Without any, the engine falls back to a console
    /// sink on stdout.
    #[must_use = "builder methods return a new value"]
    pub fn writer<W: LogWriter + 'static>(mut self, writer: W) -> Self {
        self.writers.push(Box::new(writer));
        self
    }

    pub fn build(self) -> Result<Arc<DispatchEngine>> {
        let pipeline = PatternPipeline::compile(&self.config.pattern)
            .map_err(|e| EngineError::startup(format!("cannot compile startup pattern: {}", e)))?;

        let writers: Vec<SharedWriter> = if self.writers.is_empty() {
            vec![Arc::new(Mutex::new(
                Box::new(ConsoleWriter::new()) as Box<dyn LogWriter>
            ))]
        } else {
            self.writers
                .into_iter()
                .map(|writer| Arc::new(Mutex::new(writer)))
                .collect()
        };

        let snapshot = Arc::new(ConfigSnapshot {
            min_level: self.config.min_level,
            pipeline,
            writers,
        });

        let (sender, receiver) = bounded(self.config.queue_capacity.max(1));
        let shared = Arc::new(Shared {
            snapshot: RwLock::new(snapshot),
            metrics: DispatchMetrics::new(),
            state: AtomicU8::new(RUNNING),
            stopped_lock: Mutex::new(false),
            stopped_cond: Condvar::new(),
        });

        let consumer_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("logweave-dispatch".to_string())
            .spawn(move || consume(consumer_shared, receiver))
            .map_err(|e| EngineError::startup(format!("cannot spawn consumer thread: {}", e)))?;

        let enqueue_timeout = self.config.enqueue_timeout();
        Ok(Arc::new(DispatchEngine {
            shared,
            sender: Mutex::new(Some(sender)),
            consumer: Mutex::new(Some(handle)),
            enqueue_timeout,
            source: self.source,
            applied_config: Mutex::new(self.config),
        }))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
