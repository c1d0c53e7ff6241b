//! Property-based tests for logweave using proptest

use logweave::{Level, LogEvent, PatternElement, PatternPipeline};
use proptest::prelude::*;

fn any_level() -> impl Strategy<Value = Level> {
    prop_oneof![
        Just(Level::Trace),
        Just(Level::Debug),
        Just(Level::Info),
        Just(Level::Warn),
        Just(Level::Error),
        Just(Level::Fatal),
    ]
}

proptest! {
    /// Level string conversions roundtrip
    #[test]
    fn test_level_str_roundtrip(level in any_level()) {
        let as_str = level.to_str();
        let parsed: Level = as_str.parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Level ordering matches the numeric discriminants
    #[test]
    fn test_level_ordering(level1 in any_level(), level2 in any_level()) {
        let val1 = level1 as u8;
        let val2 = level2 as u8;
        prop_assert_eq!(level1 <= level2, val1 <= val2);
        prop_assert_eq!(level1 < level2, val1 < val2);
    }
}

proptest! {
    /// Brace-free text with an unrecognized head compiles to a single
    /// verbatim element and renders as itself
    #[test]
    fn test_plain_text_is_verbatim(text in "[a-zA-Z0-9 ,.;!?-]{0,40}") {
        let spec = format!("txt {}", text);
        let pipeline = PatternPipeline::compile(&spec).unwrap();

        prop_assert_eq!(
            pipeline.elements(),
            &[PatternElement::Verbatim(spec.clone())]
        );
        prop_assert!(!pipeline.requires_caller_detail());

        let event = LogEvent::builder().message("ignored").build();
        let mut out = String::new();
        pipeline.render(&event, &mut out).unwrap();
        prop_assert_eq!(out, spec);
    }

    /// Compiling the same specification twice yields the same pipeline
    #[test]
    fn test_compilation_is_deterministic(text in "[a-zA-Z0-9 ,.;!?-]{0,40}") {
        let spec = format!("{{level}} {} {{message-and-error}}", text);
        let first = PatternPipeline::compile(&spec).unwrap();
        let second = PatternPipeline::compile(&spec).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Message templates substitute every argument in order
    #[test]
    fn test_message_resolution(values in prop::collection::vec(any::<u32>(), 0..8)) {
        let template = "v={} ".repeat(values.len());
        let arguments = values
            .iter()
            .map(|v| Box::new(*v) as logweave::Argument)
            .collect();

        let event = LogEvent::builder()
            .message(template)
            .arguments(arguments)
            .build();

        let mut expected = String::new();
        for v in &values {
            expected.push_str(&format!("v={} ", v));
        }
        prop_assert_eq!(event.resolved_message(), expected);
    }

    /// Rendering the same event through the same pipeline twice is
    /// byte-identical
    #[test]
    fn test_render_determinism(
        level in any_level(),
        message in "[a-zA-Z0-9 ]{0,30}",
    ) {
        let pipeline =
            PatternPipeline::compile("{timestamp} {level} [{thread:name}] {message-and-error}")
                .unwrap();
        let event = LogEvent::builder()
            .logger_name("prop")
            .level(level)
            .message(message)
            .build();

        let mut first = String::new();
        let mut second = String::new();
        pipeline.render(&event, &mut first).unwrap();
        pipeline.render(&event, &mut second).unwrap();
        prop_assert_eq!(first, second);
    }
}

proptest! {
    /// Unknown options inside a recognized tag never compile
    #[test]
    fn test_unknown_json_option_rejected(option in "[a-z]{1,12}") {
        // "pretty" is the only valid option this generator can produce
        prop_assume!(option != "pretty");
        let spec = format!("{{json:{}}}", option);
        prop_assert!(PatternPipeline::compile(&spec).is_err());
    }
}
