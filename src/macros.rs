//! Logging macros for ergonomic template logging.
//!
//! The macros box each argument instead of formatting it, so substitution
//! happens on the consumer thread and the call site only pays for the
//! allocation.
//!
//! # Examples
//!
//! ```
//! use logweave::{DispatchEngine, Level};
//! use logweave::writers::MemoryWriter;
//! use logweave::info;
//!
//! let engine = DispatchEngine::builder()
//!     .pattern("{level} {message-and-error}")
//!     .writer(MemoryWriter::new())
//!     .build()
//!     .expect("engine starts");
//! let logger = logweave::Logger::attached(&engine, "demo");
//!
//! let port = 8080;
//! info!(logger, "listening on port {}", port);
//! ```

/// Log a `{}` template at an explicit severity.
///
/// # Examples
///
/// ```
/// # use logweave::{DispatchEngine, Level};
/// # use logweave::writers::MemoryWriter;
/// # let engine = DispatchEngine::builder()
/// #     .writer(MemoryWriter::new())
/// #     .build()
/// #     .expect("engine starts");
/// # let logger = logweave::Logger::attached(&engine, "demo");
/// use logweave::log;
/// log!(logger, Level::Info, "simple message");
/// log!(logger, Level::Error, "error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.at_level($level).log_args(
            $template,
            vec![$(Box::new($arg) as $crate::Argument),*],
        )
    };
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::Level::Trace, $template $(, $arg)*)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::Level::Debug, $template $(, $arg)*)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::Level::Info, $template $(, $arg)*)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::Level::Warn, $template $(, $arg)*)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::Level::Error, $template $(, $arg)*)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::Level::Fatal, $template $(, $arg)*)
    };
}
