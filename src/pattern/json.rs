//! JSON rendering of a log event
//!
//! Serializes a declaration-ordered record so the field order of the output
//! is stable across renders: `timestamp`, `level`, `callerThread`,
//! `callerClass`, `callerDetail`, `context`, `message`, `exception`. Absent
//! optional fields are omitted entirely, never emitted as null. The
//! `caller-detail` option replaces the flat `callerClass` field with the
//! nested `callerDetail` frame object.

use crate::core::error::{EngineError, Result};
use crate::core::event::{CallerFrame, LogEvent, ThreadInfo};
use chrono::SecondsFormat;
use serde::Serialize;
use std::collections::HashMap;

/// Display options of the `json` pattern element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonOptions {
    pub include_caller_thread: bool,
    pub include_caller_detail: bool,
    pub pretty: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonRecord<'a> {
    timestamp: String,
    level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caller_thread: Option<&'a ThreadInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caller_class: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caller_detail: Option<&'a CallerFrame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a HashMap<String, String>>,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    exception: Option<String>,
}

pub(crate) fn render_json(event: &LogEvent, options: &JsonOptions, out: &mut String) -> Result<()> {
    let record = JsonRecord {
        timestamp: event
            .timestamp()
            .to_rfc3339_opts(SecondsFormat::Micros, true),
        level: event.level().to_str(),
        caller_thread: options
            .include_caller_thread
            .then(|| event.caller_thread()),
        caller_class: if options.include_caller_detail {
            None
        } else {
            Some(event.logger_name())
        },
        caller_detail: if options.include_caller_detail {
            event.caller_frame()
        } else {
            None
        },
        context: event.context(),
        message: event.resolved_message(),
        exception: event.error_chain(),
    };

    let text = if options.pretty {
        serde_json::to_string_pretty(&record)
    } else {
        serde_json::to_string(&record)
    }
    .map_err(|e| EngineError::render("json", e.to_string()))?;

    out.push_str(&text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::level::Level;

    fn rendered(options: JsonOptions, event: &LogEvent) -> serde_json::Value {
        let mut out = String::new();
        render_json(event, &options, &mut out).expect("render");
        serde_json::from_str(&out).expect("valid json")
    }

    fn base_event() -> LogEvent {
        LogEvent::builder()
            .logger_name("app::Main")
            .level(Level::Info)
            .caller_thread(ThreadInfo {
                name: "main".to_string(),
                id: "ThreadId(1)".to_string(),
            })
            .message("Hello, {}")
            .arguments(vec![Box::new("world")])
            .build()
    }

    #[test]
    fn test_default_shape() {
        let value = rendered(JsonOptions::default(), &base_event());

        assert!(value["timestamp"].is_string());
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["callerClass"], "app::Main");
        assert_eq!(value["message"], "Hello, world");

        let keys = value.as_object().expect("object");
        assert!(!keys.contains_key("callerThread"));
        assert!(!keys.contains_key("callerDetail"));
        assert!(!keys.contains_key("context"));
        assert!(!keys.contains_key("exception"));
    }

    #[test]
    fn test_caller_thread_option() {
        let options = JsonOptions {
            include_caller_thread: true,
            ..JsonOptions::default()
        };
        let value = rendered(options, &base_event());

        assert_eq!(value["callerThread"]["name"], "main");
        assert_eq!(value["callerThread"]["id"], "ThreadId(1)");
    }

    #[test]
    fn test_caller_detail_replaces_class() {
        let event = LogEvent::builder()
            .logger_name("app::Main")
            .level(Level::Info)
            .caller_frame(CallerFrame {
                class_name: "app::Main".to_string(),
                method_name: "run".to_string(),
                file_name: Some("src/main.rs".to_string()),
                line_number: Some(3),
            })
            .message("hi")
            .build();

        let options = JsonOptions {
            include_caller_detail: true,
            ..JsonOptions::default()
        };
        let value = rendered(options, &event);

        assert!(!value.as_object().expect("object").contains_key("callerClass"));
        assert_eq!(value["callerDetail"]["className"], "app::Main");
        assert_eq!(value["callerDetail"]["methodName"], "run");
        assert_eq!(value["callerDetail"]["fileName"], "src/main.rs");
        assert_eq!(value["callerDetail"]["lineNumber"], 3);
    }

    #[test]
    fn test_exception_field() {
        let event = LogEvent::builder()
            .logger_name("app::Main")
            .level(Level::Error)
            .message("failed")
            .error(Box::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no route to host",
            )))
            .build();

        let value = rendered(JsonOptions::default(), &event);
        assert!(value["exception"]
            .as_str()
            .expect("string")
            .contains("no route to host"));
    }

    #[test]
    fn test_field_order_is_stable() {
        let event = base_event();
        let mut first = String::new();
        let mut second = String::new();
        render_json(&event, &JsonOptions::default(), &mut first).expect("render");
        render_json(&event, &JsonOptions::default(), &mut second).expect("render");

        assert_eq!(first, second);
        let timestamp_at = first.find("\"timestamp\"").expect("timestamp key");
        let level_at = first.find("\"level\"").expect("level key");
        let message_at = first.find("\"message\"").expect("message key");
        assert!(timestamp_at < level_at && level_at < message_at);
    }

    #[test]
    fn test_pretty_output() {
        let options = JsonOptions {
            pretty: true,
            ..JsonOptions::default()
        };
        let mut out = String::new();
        render_json(&base_event(), &options, &mut out).expect("render");
        assert!(out.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&out).expect("valid json");
        assert_eq!(value["message"], "Hello, world");
    }
}
