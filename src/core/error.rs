//! Error types for the logging engine

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Malformed or unknown tag/option in a pattern specification.
    ///
    /// Raised at compile time only; a compiled pipeline never produces
    /// this error during rendering.
    #[error("invalid pattern segment '{segment}': {reason}")]
    InvalidPattern { segment: String, reason: String },

    /// The boundary type was absent from a captured call stack
    #[error("caller of '{boundary}' not found in call stack")]
    CallerNotFound { boundary: String },

    /// Failure inside an element's render step
    #[error("render failed in '{element}' element: {message}")]
    Render { element: String, message: String },

    /// I/O failure from an output sink
    #[error("writer '{writer}' failed: {message}")]
    Writer { writer: String, message: String },

    /// Inability to construct a working engine at startup
    #[error("engine startup failed: {0}")]
    Startup(String),

    /// Invalid configuration value or source
    #[error("invalid configuration for {component}: {message}")]
    Config { component: String, message: String },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Create an invalid-pattern error carrying the offending segment
    pub fn pattern(segment: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InvalidPattern {
            segment: segment.into(),
            reason: reason.into(),
        }
    }

    /// Create a caller-not-found error
    pub fn caller_not_found(boundary: impl Into<String>) -> Self {
        EngineError::CallerNotFound {
            boundary: boundary.into(),
        }
    }

    /// Create a render error
    pub fn render(element: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Render {
            element: element.into(),
            message: message.into(),
        }
    }

    /// Create a writer error
    pub fn writer(writer: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Writer {
            writer: writer.into(),
            message: message.into(),
        }
    }

    /// Create a startup error
    pub fn startup(message: impl Into<String>) -> Self {
        EngineError::Startup(message.into())
    }

    /// Create a configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Config {
            component: component.into(),
            message: message.into(),
        }
    }
}
