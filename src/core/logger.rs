//! Level-gated logging facade
//!
//! A [`Logger`] is a cheap handle: a name, a severity, and a reference to the
//! dispatch engine. The `at_*` combinators derive a sibling at another
//! severity. The facade builds the [`LogEvent`] on the calling thread —
//! including the caller frame, but only when the active pattern demands it —
//! and hands it to the engine; it never renders and never touches I/O.

use super::caller;
use super::context::ThreadContext;
use super::dispatch::DispatchEngine;
use super::event::{Argument, EventError, LogEvent};
use super::level::Level;
use std::sync::Arc;

#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    level: Level,
    engine: Arc<DispatchEngine>,
}

impl Logger {
    pub fn new(name: impl Into<String>, level: Level, engine: Arc<DispatchEngine>) -> Self {
        Self {
            name: Arc::from(name.into()),
            level,
            engine,
        }
    }

    /// A logger on `engine` named for the caller's component, at Info
    /// severity
    pub fn attached(engine: &Arc<DispatchEngine>, name: impl Into<String>) -> Logger {
        Logger::new(name, Level::Info, Arc::clone(engine))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// A sibling logger at the given severity
    pub fn at_level(&self, level: Level) -> Logger {
        if level == self.level {
            self.clone()
        } else {
            Logger {
                name: Arc::clone(&self.name),
                level,
                engine: Arc::clone(&self.engine),
            }
        }
    }

    pub fn at_trace(&self) -> Logger {
        self.at_level(Level::Trace)
    }

    pub fn at_debug(&self) -> Logger {
        self.at_level(Level::Debug)
    }

    pub fn at_info(&self) -> Logger {
        self.at_level(Level::Info)
    }

    pub fn at_warn(&self) -> Logger {
        self.at_level(Level::Warn)
    }

    pub fn at_error(&self) -> Logger {
        self.at_level(Level::Error)
    }

    pub fn at_fatal(&self) -> Logger {
        self.at_level(Level::Fatal)
    }

    /// Whether a call on this logger would currently produce an event
    pub fn is_enabled(&self) -> bool {
        self.engine.is_enabled(self.level)
    }

    /// Log a plain message at this logger's severity
    pub fn log(&self, message: impl Into<String>) {
        self.emit(message.into(), Vec::new(), None);
    }

    /// Log a `{}` template; arguments are formatted on the consumer thread
    pub fn log_args(&self, template: impl Into<String>, arguments: Vec<Argument>) {
        self.emit(template.into(), arguments, None);
    }

    /// Log a template with an attached error
    pub fn log_error(
        &self,
        error: impl Into<EventError>,
        template: impl Into<String>,
        arguments: Vec<Argument>,
    ) {
        self.emit(template.into(), arguments, Some(error.into()));
    }

    #[inline(never)]
    fn emit(&self, message: String, arguments: Vec<Argument>, error: Option<EventError>) {
        let snapshot = self.engine.snapshot();
        if self.level < snapshot.min_level() {
            return;
        }

        // The stack walk is the most expensive step in the pipeline; the
        // compiled pattern's aggregate flag is the only thing that triggers
        // it, never a guess.
        let caller_frame = if snapshot.pipeline().requires_caller_detail() {
            self.engine.metrics().record_caller_capture();
            let frames = caller::capture_stack();
            match caller::resolve_caller(&frames, std::any::type_name::<Logger>()) {
                Ok(frame) => Some(frame),
                Err(e) => {
                    // The event still goes out, just without a frame.
                    self.engine.metrics().record_caller_miss();
                    eprintln!("[LOGWEAVE ERROR] {}", e);
                    None
                }
            }
        } else {
            None
        };

        let mut builder = LogEvent::builder()
            .logger_name(self.name.as_ref())
            .level(self.level)
            .message(message)
            .arguments(arguments);
        if let Some(frame) = caller_frame {
            builder = builder.caller_frame(frame);
        }
        if let Some(error) = error {
            builder = builder.error(error);
        }
        if let Some(context) = ThreadContext::snapshot() {
            builder = builder.context(context);
        }
        self.engine.enqueue(builder.build());
    }
}
