//! Pattern rendering elements
//!
//! A closed set of rendering units. Each element appends its fragment of the
//! final log line to a shared output buffer; rendering is a pure function of
//! the event, so one compiled element can serve concurrent renders of
//! different events without locking.

use super::json::{render_json, JsonOptions};
use crate::core::error::Result;
use crate::core::event::LogEvent;
use std::fmt::Write;

/// Default timestamp rendering: ISO 8601 with milliseconds, UTC
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// How the thread element displays the calling thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadDisplay {
    Id,
    #[default]
    Name,
}

/// One rendering unit of a compiled pattern
#[derive(Debug, Clone, PartialEq)]
pub enum PatternElement {
    /// Literal text between tagged segments
    Verbatim(String),
    /// Event timestamp; the option is a validated strftime string
    Timestamp(Option<String>),
    /// Severity label
    Level,
    /// One key of the event's context snapshot; empty when absent
    Context { key: String },
    /// Calling thread id or name
    Thread { display: ThreadDisplay },
    /// Declaring class of the call site (the logger name)
    CallerClass,
    /// Resolved caller frame as `class.method(file:line)`
    CallerFrame,
    /// Resolved message, then the error chain when one is attached
    MessageAndError,
    /// Structured JSON record of the whole event
    Json(JsonOptions),
}

impl PatternElement {
    /// Whether rendering this element needs the resolved caller frame
    pub fn requires_caller_detail(&self) -> bool {
        match self {
            PatternElement::CallerFrame => true,
            PatternElement::Json(options) => options.include_caller_detail,
            PatternElement::Verbatim(_)
            | PatternElement::Timestamp(_)
            | PatternElement::Level
            | PatternElement::Context { .. }
            | PatternElement::Thread { .. }
            | PatternElement::CallerClass
            | PatternElement::MessageAndError => false,
        }
    }

    /// Append this element's rendering of `event` to `out`
    pub fn render(&self, event: &LogEvent, out: &mut String) -> Result<()> {
        match self {
            PatternElement::Verbatim(text) => out.push_str(text),

            PatternElement::Timestamp(custom) => {
                let format = custom.as_deref().unwrap_or(DEFAULT_TIMESTAMP_FORMAT);
                let _ = write!(out, "{}", event.timestamp().format(format));
            }

            PatternElement::Level => out.push_str(event.level().to_str()),

            PatternElement::Context { key } => {
                if let Some(value) = event.context().and_then(|map| map.get(key)) {
                    out.push_str(value);
                }
            }

            PatternElement::Thread { display } => {
                let thread = event.caller_thread();
                out.push_str(match display {
                    ThreadDisplay::Id => &thread.id,
                    ThreadDisplay::Name => &thread.name,
                });
            }

            PatternElement::CallerClass => out.push_str(event.logger_name()),

            PatternElement::CallerFrame => {
                // An event built before a caller-detail refresh carries no
                // frame; render nothing rather than guessing.
                if let Some(frame) = event.caller_frame() {
                    out.push_str(&frame.class_name);
                    out.push('.');
                    out.push_str(&frame.method_name);
                    out.push('(');
                    out.push_str(frame.file_name.as_deref().unwrap_or("?"));
                    out.push(':');
                    match frame.line_number {
                        Some(line) => {
                            let _ = write!(out, "{}", line);
                        }
                        None => out.push('?'),
                    }
                    out.push(')');
                }
            }

            PatternElement::MessageAndError => {
                out.push_str(event.resolved_message());
                if let Some(chain) = event.error_chain() {
                    out.push('\n');
                    out.push_str(&chain);
                }
            }

            PatternElement::Json(options) => render_json(event, options, out)?,
        }
        Ok(())
    }
}
