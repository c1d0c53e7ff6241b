//! Core engine types and traits

pub mod caller;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod level;
pub mod lifecycle;
pub mod logger;
pub mod metrics;
pub mod writer;

pub use caller::{capture_stack, resolve_caller, StackFrame};
pub use config::{ConfigSource, EngineConfig, TomlFileSource};
pub use context::{ContextGuard, ThreadContext};
pub use dispatch::{
    ConfigSnapshot, DispatchEngine, EngineBuilder, SharedWriter, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use error::{EngineError, Result};
pub use event::{Argument, CallerFrame, EventError, LogEvent, LogEventBuilder, ThreadInfo};
pub use level::Level;
pub use lifecycle::{LifecycleCoordinator, Refreshable, ShutdownGuard, Stoppable};
pub use logger::Logger;
pub use metrics::DispatchMetrics;
pub use writer::LogWriter;
