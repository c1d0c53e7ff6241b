//! Pattern compilation
//!
//! A pattern specification is literal text interleaved with tagged segments:
//! `{tag}` or `{tag:option1,option2}`. Everything outside braces renders
//! verbatim; as a convenience, a brace-free specification whose whole text is
//! a recognized `tag[:options]` is treated as that single tagged segment.
//!
//! Compilation is pure and fail-fast: an unknown tag inside braces, an
//! unknown option inside a recognized tag, a missing `context` key, or an
//! invalid `timestamp` format string is rejected here, with the offending
//! segment in the error. Render never revisits validation.

mod element;
mod json;

pub use element::{PatternElement, ThreadDisplay, DEFAULT_TIMESTAMP_FORMAT};
pub use json::JsonOptions;

use crate::core::error::{EngineError, Result};
use crate::core::event::LogEvent;
use chrono::format::{strftime::StrftimeItems, Item};

/// Compiled, ordered sequence of rendering elements
///
/// Built once per pattern specification and shared read-only across renders.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternPipeline {
    elements: Vec<PatternElement>,
    requires_caller_detail: bool,
}

impl PatternPipeline {
    /// Compile a pattern specification
    pub fn compile(spec: &str) -> Result<Self> {
        if spec.trim().is_empty() {
            return Err(EngineError::pattern(spec, "blank pattern specification"));
        }

        // Brace-free shorthand: the whole spec as one tagged segment
        if !spec.contains('{') && !spec.contains('}') {
            let element = parse_tag(spec)?
                .unwrap_or_else(|| PatternElement::Verbatim(spec.to_string()));
            return Ok(Self::from_elements(vec![element]));
        }

        let mut elements = Vec::new();
        let mut rest = spec;
        while !rest.is_empty() {
            match rest.find('{') {
                Some(open) => {
                    if open > 0 {
                        elements.push(PatternElement::Verbatim(rest[..open].to_string()));
                    }
                    let tail = &rest[open + 1..];
                    let close = tail.find('}').ok_or_else(|| {
                        EngineError::pattern(&rest[open..], "unclosed '{' in pattern")
                    })?;
                    let segment = &tail[..close];
                    let element = parse_tag(segment)?.ok_or_else(|| {
                        EngineError::pattern(
                            format!("{{{}}}", segment),
                            format!("unknown pattern tag '{}'", tag_head(segment)),
                        )
                    })?;
                    elements.push(element);
                    rest = &tail[close + 1..];
                }
                None => {
                    elements.push(PatternElement::Verbatim(rest.to_string()));
                    break;
                }
            }
        }
        Ok(Self::from_elements(elements))
    }

    fn from_elements(elements: Vec<PatternElement>) -> Self {
        let requires_caller_detail = elements
            .iter()
            .any(PatternElement::requires_caller_detail);
        Self {
            elements,
            requires_caller_detail,
        }
    }

    pub fn elements(&self) -> &[PatternElement] {
        &self.elements
    }

    /// Aggregate over all elements; the facade consults this before paying
    /// for a stack capture
    pub fn requires_caller_detail(&self) -> bool {
        self.requires_caller_detail
    }

    /// Render `event` through every element in order, appending to `out`
    pub fn render(&self, event: &LogEvent, out: &mut String) -> Result<()> {
        for element in &self.elements {
            element.render(event, out)?;
        }
        Ok(())
    }
}

fn tag_head(segment: &str) -> &str {
    match segment.split_once(':') {
        Some((head, _)) => head.trim(),
        None => segment.trim(),
    }
}

/// Parse one tagged segment. `Ok(None)` means the head is not a recognized
/// tag; a recognized head with invalid options is an error, not a fallback.
fn parse_tag(segment: &str) -> Result<Option<PatternElement>> {
    let (head, option) = match segment.split_once(':') {
        Some((head, option)) => (head.trim(), Some(option.trim())),
        None => (segment.trim(), None),
    };

    let element = match head {
        "timestamp" => match option {
            Some(format) => {
                validate_strftime(segment, format)?;
                PatternElement::Timestamp(Some(format.to_string()))
            }
            None => PatternElement::Timestamp(None),
        },

        "level" => {
            reject_options(segment, option)?;
            PatternElement::Level
        }

        "context" => {
            let key = option.filter(|key| !key.is_empty()).ok_or_else(|| {
                EngineError::pattern(segment, "no key configured in 'context' element")
            })?;
            PatternElement::Context {
                key: key.to_string(),
            }
        }

        "thread" => {
            let display = match option {
                None => ThreadDisplay::Name,
                Some(o) if o.eq_ignore_ascii_case("name") => ThreadDisplay::Name,
                Some(o) if o.eq_ignore_ascii_case("id") => ThreadDisplay::Id,
                Some(other) => {
                    return Err(EngineError::pattern(
                        segment,
                        format!("unknown thread display option '{}'", other),
                    ));
                }
            };
            PatternElement::Thread { display }
        }

        "caller-class" => {
            reject_options(segment, option)?;
            PatternElement::CallerClass
        }

        "caller-frame" => {
            reject_options(segment, option)?;
            PatternElement::CallerFrame
        }

        "message-and-error" => {
            reject_options(segment, option)?;
            PatternElement::MessageAndError
        }

        "json" => {
            let mut options = JsonOptions::default();
            if let Some(list) = option {
                for item in list.split(',') {
                    match item.trim() {
                        "caller-thread" => options.include_caller_thread = true,
                        "caller-detail" => options.include_caller_detail = true,
                        "pretty" => options.pretty = true,
                        other => {
                            return Err(EngineError::pattern(
                                segment,
                                format!("unknown JSON display option '{}'", other),
                            ));
                        }
                    }
                }
            }
            PatternElement::Json(options)
        }

        _ => return Ok(None),
    };
    Ok(Some(element))
}

fn reject_options(segment: &str, option: Option<&str>) -> Result<()> {
    match option {
        Some(option) => Err(EngineError::pattern(
            segment,
            format!("tag takes no options, got '{}'", option),
        )),
        None => Ok(()),
    }
}

fn validate_strftime(segment: &str, format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(EngineError::pattern(
            segment,
            format!("invalid timestamp format '{}'", format),
        ));
    }
    Ok(())
}
