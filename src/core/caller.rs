//! Caller-frame capture and resolution
//!
//! The stack walk is the most expensive step in the whole pipeline, so it is
//! performed at most once per event and only when the compiled pattern's
//! caller-detail flag demands it. The facade captures the stack on the
//! producer thread and resolves the direct external caller of the logging
//! boundary by skipping every contiguous boundary frame.

use super::error::{EngineError, Result};
use super::event::CallerFrame;

/// One symbolized frame of a captured call stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Fully qualified symbol, e.g. `app::server::Handler::run`
    pub symbol: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl StackFrame {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            file: None,
            line: None,
        }
    }

    /// The declaring type of this frame: the symbol minus its trailing
    /// method segment. A single-segment symbol is its own type.
    pub fn type_name(&self) -> &str {
        match self.symbol.rfind("::") {
            Some(at) => &self.symbol[..at],
            None => &self.symbol,
        }
    }

    /// The trailing method segment of the symbol
    pub fn method_name(&self) -> &str {
        match self.symbol.rfind("::") {
            Some(at) => &self.symbol[at + 2..],
            None => &self.symbol,
        }
    }
}

/// Capture the current call stack, innermost frame first.
///
/// Symbol resolution is eager; the caller is expected to have consulted the
/// pipeline's caller-detail flag before paying for this.
pub fn capture_stack() -> Vec<StackFrame> {
    let backtrace = backtrace::Backtrace::new();
    let mut frames = Vec::with_capacity(backtrace.frames().len());
    for frame in backtrace.frames() {
        for symbol in frame.symbols() {
            let Some(name) = symbol.name() else { continue };
            frames.push(StackFrame {
                symbol: strip_hash_suffix(&name.to_string()).to_string(),
                file: symbol
                    .filename()
                    .map(|path| path.to_string_lossy().into_owned()),
                line: symbol.lineno(),
            });
        }
    }
    frames
}

// Demangled symbols may carry a trailing `::h0123abcd...` disambiguator.
fn strip_hash_suffix(symbol: &str) -> &str {
    if let Some(at) = symbol.rfind("::") {
        let tail = &symbol[at + 2..];
        if tail.len() == 17
            && tail.starts_with('h')
            && tail[1..].chars().all(|c| c.is_ascii_hexdigit())
        {
            return &symbol[..at];
        }
    }
    symbol
}

/// Find the direct external caller of `boundary_type` in `frames`.
///
/// Walks from the innermost frame outward. Frames before the boundary is
/// first seen belong to engine internals and are skipped; once seen, the
/// entire contiguous run of boundary frames is skipped and the first frame of
/// a different type is the caller. Fails with
/// [`EngineError::CallerNotFound`] when no boundary frame exists at all.
pub fn resolve_caller(frames: &[StackFrame], boundary_type: &str) -> Result<CallerFrame> {
    let mut boundary_seen = false;
    for frame in frames {
        if belongs_to(frame, boundary_type) {
            boundary_seen = true;
        } else if boundary_seen {
            return Ok(CallerFrame {
                class_name: frame.type_name().to_string(),
                method_name: frame.method_name().to_string(),
                file_name: frame.file.clone(),
                line_number: frame.line,
            });
        }
    }
    Err(EngineError::caller_not_found(boundary_type))
}

// Monomorphized and nested symbols keep the boundary type as a path prefix
// (`Boundary::log::<T>`, `Boundary::Inner::delegate`), so a plain type-name
// comparison is not enough.
fn belongs_to(frame: &StackFrame, boundary_type: &str) -> bool {
    frame.type_name() == boundary_type
        || frame
            .symbol
            .strip_prefix(boundary_type)
            .is_some_and(|rest| rest.starts_with("::"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(symbols: &[&str]) -> Vec<StackFrame> {
        symbols.iter().map(|s| StackFrame::new(*s)).collect()
    }

    #[test]
    fn test_skips_contiguous_boundary_frames() {
        let stack = frames(&[
            "App::foo",
            "Boundary::log",
            "Boundary::internal",
            "Boundary::log",
            "Wrapper::bar",
        ]);

        let caller = resolve_caller(&stack, "Boundary").expect("caller resolved");
        assert_eq!(caller.class_name, "Wrapper");
        assert_eq!(caller.method_name, "bar");
    }

    #[test]
    fn test_frames_before_boundary_are_ignored() {
        let stack = frames(&["deep::capture", "Boundary::log", "App::main"]);

        let caller = resolve_caller(&stack, "Boundary").expect("caller resolved");
        assert_eq!(caller.class_name, "App");
    }

    #[test]
    fn test_boundary_absent_is_an_error() {
        let stack = frames(&["App::foo", "App::main"]);

        let err = resolve_caller(&stack, "NotInCallStack").unwrap_err();
        assert!(matches!(err, EngineError::CallerNotFound { .. }));
    }

    #[test]
    fn test_boundary_innermost_frame() {
        let stack = frames(&["Boundary::log", "App::main"]);

        let caller = resolve_caller(&stack, "Boundary").expect("caller resolved");
        assert_eq!(caller.class_name, "App");
        assert_eq!(caller.method_name, "main");
    }

    #[test]
    fn test_carries_file_and_line() {
        let mut stack = frames(&["Boundary::log"]);
        stack.push(StackFrame {
            symbol: "App::main".to_string(),
            file: Some("src/main.rs".to_string()),
            line: Some(42),
        });

        let caller = resolve_caller(&stack, "Boundary").expect("caller resolved");
        assert_eq!(caller.file_name.as_deref(), Some("src/main.rs"));
        assert_eq!(caller.line_number, Some(42));
    }

    #[test]
    fn test_type_and_method_split() {
        let frame = StackFrame::new("app::server::Handler::run");
        assert_eq!(frame.type_name(), "app::server::Handler");
        assert_eq!(frame.method_name(), "run");

        let bare = StackFrame::new("main");
        assert_eq!(bare.type_name(), "main");
        assert_eq!(bare.method_name(), "main");
    }

    #[test]
    fn test_nested_boundary_symbols_are_skipped() {
        let stack = frames(&[
            "Boundary::log::<alloc::string::String>",
            "Boundary::Inner::delegate",
            "App::main",
        ]);

        let caller = resolve_caller(&stack, "Boundary").expect("caller resolved");
        assert_eq!(caller.class_name, "App");
    }

    #[test]
    fn test_similarly_named_type_is_not_boundary() {
        let stack = frames(&["Boundary::log", "Boundary2::relay", "App::main"]);

        let caller = resolve_caller(&stack, "Boundary").expect("caller resolved");
        assert_eq!(caller.class_name, "Boundary2");
    }

    #[test]
    fn test_strip_hash_suffix() {
        assert_eq!(
            strip_hash_suffix("app::Handler::run::h0123456789abcdef"),
            "app::Handler::run"
        );
        assert_eq!(strip_hash_suffix("app::Handler::run"), "app::Handler::run");
    }

    #[test]
    fn test_capture_stack_contains_this_test() {
        let stack = capture_stack();
        assert!(!stack.is_empty());
        assert!(stack
            .iter()
            .any(|frame| frame.symbol.contains("test_capture_stack_contains_this_test")));
    }
}
