//! Log event structure
//!
//! A [`LogEvent`] is the immutable snapshot of one log call. It is built on
//! the producer thread, moved through the dispatch queue, and rendered on the
//! consumer thread. Message formatting is deferred: the template and its
//! arguments travel with the event and are substituted at most once, on first
//! access to [`LogEvent::resolved_message`].

use super::level::Level;
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// A deferred message argument, formatted on the consumer thread
pub type Argument = Box<dyn fmt::Display + Send + Sync>;

/// An error attached to a log event
pub type EventError = Box<dyn Error + Send + Sync>;

// Thread information is captured on every event; cache it per thread so the
// hot path pays one clone instead of two syscalls and an allocation.
thread_local! {
    static THREAD_INFO_CACHE: RefCell<Option<ThreadInfo>> = const { RefCell::new(None) };
}

/// Name and id of the thread that issued a log call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadInfo {
    pub name: String,
    pub id: String,
}

impl ThreadInfo {
    /// Capture the current thread, cached after the first call per thread.
    /// Unnamed threads fall back to the id as their display name.
    pub fn current() -> Self {
        THREAD_INFO_CACHE.with(|cache| {
            let mut cache = cache.borrow_mut();
            cache
                .get_or_insert_with(|| {
                    let current = std::thread::current();
                    let id = format!("{:?}", current.id());
                    let name = current.name().map_or_else(|| id.clone(), String::from);
                    ThreadInfo { name, id }
                })
                .clone()
        })
    }
}

/// Resolved call-site frame: the direct external caller of the logging boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerFrame {
    pub class_name: String,
    pub method_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
}

/// Immutable snapshot of one log call
pub struct LogEvent {
    logger_name: String,
    level: Level,
    timestamp: DateTime<Utc>,
    caller_thread: ThreadInfo,
    caller_frame: Option<CallerFrame>,
    message: String,
    arguments: Vec<Argument>,
    resolved: OnceCell<String>,
    error: Option<EventError>,
    context: Option<HashMap<String, String>>,
}

impl LogEvent {
    pub fn builder() -> LogEventBuilder {
        LogEventBuilder::default()
    }

    pub fn logger_name(&self) -> &str {
        &self.logger_name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn caller_thread(&self) -> &ThreadInfo {
        &self.caller_thread
    }

    /// Present only when the active pattern required caller detail at the
    /// time this event was built
    pub fn caller_frame(&self) -> Option<&CallerFrame> {
        self.caller_frame.as_ref()
    }

    pub fn error(&self) -> Option<&(dyn Error + 'static)> {
        self.error.as_deref().map(|e| e as &(dyn Error + 'static))
    }

    pub fn context(&self) -> Option<&HashMap<String, String>> {
        self.context.as_ref()
    }

    /// The message with every `{}` placeholder substituted in argument order.
    ///
    /// Computed once; repeated renders of the same event see the same string.
    pub fn resolved_message(&self) -> &str {
        self.resolved
            .get_or_init(|| resolve_message(&self.message, &self.arguments))
    }

    /// The attached error rendered as its source chain, one cause per line
    pub fn error_chain(&self) -> Option<String> {
        self.error.as_deref().map(|top| {
            let mut text = top.to_string();
            let mut source = top.source();
            while let Some(cause) = source {
                text.push_str("\nCaused by: ");
                text.push_str(&cause.to_string());
                source = cause.source();
            }
            text
        })
    }
}

impl fmt::Debug for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogEvent")
            .field("logger_name", &self.logger_name)
            .field("level", &self.level)
            .field("timestamp", &self.timestamp)
            .field("caller_thread", &self.caller_thread)
            .field("caller_frame", &self.caller_frame)
            .field("message", &self.message)
            .field("arguments", &self.arguments.len())
            .field("has_error", &self.error.is_some())
            .field("context", &self.context)
            .finish()
    }
}

fn resolve_message(template: &str, arguments: &[Argument]) -> String {
    let mut resolved = String::with_capacity(template.len() + 16 * arguments.len());
    let mut remainder = template;
    let mut next = arguments.iter();
    while let Some(at) = remainder.find("{}") {
        resolved.push_str(&remainder[..at]);
        match next.next() {
            Some(argument) => {
                use fmt::Write;
                let _ = write!(resolved, "{}", argument);
            }
            // More placeholders than arguments: leave the rest verbatim
            None => resolved.push_str("{}"),
        }
        remainder = &remainder[at + 2..];
    }
    resolved.push_str(remainder);
    resolved
}

/// Builder for [`LogEvent`]
///
/// The facade fills this in on the hot path; tests and embedders can build
/// events directly with pinned timestamps and frames.
#[derive(Default)]
pub struct LogEventBuilder {
    logger_name: Option<String>,
    level: Option<Level>,
    timestamp: Option<DateTime<Utc>>,
    caller_thread: Option<ThreadInfo>,
    caller_frame: Option<CallerFrame>,
    message: Option<String>,
    arguments: Vec<Argument>,
    error: Option<EventError>,
    context: Option<HashMap<String, String>>,
}

impl LogEventBuilder {
    #[must_use]
    pub fn logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    #[must_use]
    pub fn caller_thread(mut self, thread: ThreadInfo) -> Self {
        self.caller_thread = Some(thread);
        self
    }

    #[must_use]
    pub fn caller_frame(mut self, frame: CallerFrame) -> Self {
        self.caller_frame = Some(frame);
        self
    }

    #[must_use]
    pub fn message(mut self, template: impl Into<String>) -> Self {
        self.message = Some(template.into());
        self
    }

    #[must_use]
    pub fn arguments(mut self, arguments: Vec<Argument>) -> Self {
        self.arguments = arguments;
        self
    }

    #[must_use]
    pub fn error(mut self, error: EventError) -> Self {
        self.error = Some(error);
        self
    }

    #[must_use]
    pub fn context(mut self, context: HashMap<String, String>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn build(self) -> LogEvent {
        LogEvent {
            logger_name: self.logger_name.unwrap_or_default(),
            level: self.level.unwrap_or_default(),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            caller_thread: self.caller_thread.unwrap_or_else(ThreadInfo::current),
            caller_frame: self.caller_frame,
            message: self.message.unwrap_or_default(),
            arguments: self.arguments,
            resolved: OnceCell::new(),
            error: self.error,
            context: self.context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_with(template: &str, arguments: Vec<Argument>) -> LogEvent {
        LogEvent::builder()
            .logger_name("test")
            .level(Level::Info)
            .message(template)
            .arguments(arguments)
            .build()
    }

    #[test]
    fn test_resolve_in_order() {
        let event = event_with("Hello, {}", vec![Box::new("world")]);
        assert_eq!(event.resolved_message(), "Hello, world");
    }

    #[test]
    fn test_resolve_multiple_arguments() {
        let event = event_with("{} + {} = {}", vec![Box::new(1), Box::new(2), Box::new(3)]);
        assert_eq!(event.resolved_message(), "1 + 2 = 3");
    }

    #[test]
    fn test_resolve_missing_arguments_left_verbatim() {
        let event = event_with("got {} and {}", vec![Box::new("one")]);
        assert_eq!(event.resolved_message(), "got one and {}");
    }

    #[test]
    fn test_resolve_no_placeholders() {
        let event = event_with("plain text", Vec::new());
        assert_eq!(event.resolved_message(), "plain text");
    }

    #[test]
    fn test_resolved_once() {
        let event = event_with("x = {}", vec![Box::new(42)]);
        let first = event.resolved_message() as *const str;
        let second = event.resolved_message() as *const str;
        assert_eq!(first, second);
    }

    #[test]
    fn test_error_chain() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let event = LogEvent::builder()
            .message("boom")
            .error(Box::new(inner))
            .build();

        let chain = event.error_chain().expect("error attached");
        assert!(chain.contains("disk on fire"));
    }

    #[test]
    fn test_thread_info_captured() {
        let event = event_with("hi", Vec::new());
        assert!(!event.caller_thread().name.is_empty());
        assert!(!event.caller_thread().id.is_empty());
    }

    #[test]
    fn test_caller_frame_absent_by_default() {
        let event = event_with("hi", Vec::new());
        assert!(event.caller_frame().is_none());
    }
}
