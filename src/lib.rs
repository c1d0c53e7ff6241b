//! # Logweave
//!
//! An asynchronous, pattern-driven logging engine. A log call becomes an
//! immutable event on the calling thread, travels through a bounded queue,
//! and is rendered and written by a dedicated consumer thread, so
//! application threads never wait on I/O.
//!
//! ## Features
//!
//! - **Lazy caller detail**: the stack is only walked when the compiled
//!   pattern actually renders call-site information
//! - **Pattern pipeline**: a small text/JSON pattern language, validated
//!   entirely at compile time
//! - **Bounded backpressure**: producers use a timed queue insert and are
//!   never blocked indefinitely; overflow is counted, not hidden
//! - **Coordinated lifecycle**: refresh swaps whole configuration snapshots
//!   atomically; shutdown drains every accepted event before returning
//!
//! ## Example
//!
//! ```
//! use logweave::{DispatchEngine, Level, LifecycleCoordinator, Logger};
//! use logweave::writers::MemoryWriter;
//!
//! let sink = MemoryWriter::new();
//! let engine = DispatchEngine::builder()
//!     .pattern("{timestamp} {level} {caller-class} - {message-and-error}")
//!     .min_level(Level::Debug)
//!     .writer(sink.clone())
//!     .build()
//!     .expect("engine starts");
//!
//! let coordinator = LifecycleCoordinator::new();
//! coordinator.register_stoppable(engine.clone());
//!
//! let logger = Logger::attached(&engine, "app::server");
//! logger.log_args("accepted connection from {}", vec![Box::new("10.0.0.7")]);
//!
//! coordinator.shutdown_all();
//! assert_eq!(sink.len(), 1);
//! ```

pub mod core;
pub mod macros;
pub mod pattern;
pub mod writers;

pub mod prelude {
    pub use crate::core::{
        Argument, ConfigSource, ContextGuard, DispatchEngine, DispatchMetrics, EngineBuilder,
        EngineConfig, EngineError, EventError, Level, LifecycleCoordinator, LogEvent,
        LogEventBuilder, LogWriter, Logger, Refreshable, Result, ShutdownGuard, Stoppable,
        ThreadContext, ThreadInfo, TomlFileSource, DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::pattern::{JsonOptions, PatternElement, PatternPipeline, ThreadDisplay};
    pub use crate::writers::{ConsoleWriter, FileWriter, MemoryWriter};
}

pub use crate::core::{
    capture_stack, resolve_caller, Argument, CallerFrame, ConfigSnapshot, ConfigSource,
    ContextGuard, DispatchEngine, DispatchMetrics, EngineBuilder, EngineConfig, EngineError,
    EventError, Level, LifecycleCoordinator, LogEvent, LogEventBuilder, LogWriter, Logger,
    Refreshable, Result, SharedWriter, ShutdownGuard, StackFrame, Stoppable, ThreadContext,
    ThreadInfo, TomlFileSource, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use crate::pattern::{JsonOptions, PatternElement, PatternPipeline, ThreadDisplay};
