//! Engine configuration
//!
//! The persisted surface is a small TOML document; refresh-with-overrides
//! takes a flat string map instead, bypassing the source. Writer construction
//! is not a configuration concern here: sinks are supplied to the builder by
//! the composition root.

use super::error::{EngineError, Result};
use super::level::Level;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PATTERN: &str = "{timestamp} {level} {caller-class} - {message-and-error}";
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_ENQUEUE_TIMEOUT_MS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Pattern specification compiled into the rendering pipeline
    pub pattern: String,
    /// Events below this level are discarded before an event is built
    pub min_level: Level,
    /// Bounded queue capacity; fixed for the engine's lifetime
    pub queue_capacity: usize,
    /// How long a producer may wait for queue space before the event is lost
    pub enqueue_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            min_level: Level::Info,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            enqueue_timeout_ms: DEFAULT_ENQUEUE_TIMEOUT_MS,
        }
    }
}

impl EngineConfig {
    pub fn enqueue_timeout(&self) -> Duration {
        Duration::from_millis(self.enqueue_timeout_ms)
    }

    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| EngineError::config("engine", e.to_string()))
    }

    /// Apply a flat override map on top of `self`.
    ///
    /// Unknown keys and unparsable values are rejected; overrides share the
    /// compiler's fail-fast posture.
    pub fn with_overrides(&self, overrides: &HashMap<String, String>) -> Result<Self> {
        let mut config = self.clone();
        for (key, value) in overrides {
            match key.as_str() {
                "pattern" => config.pattern = value.clone(),
                "min_level" => {
                    config.min_level = value
                        .parse()
                        .map_err(|e: String| EngineError::config("min_level", e))?;
                }
                "queue_capacity" => {
                    config.queue_capacity = value
                        .parse()
                        .map_err(|e| EngineError::config("queue_capacity", format!("{}", e)))?;
                }
                "enqueue_timeout_ms" => {
                    config.enqueue_timeout_ms = value
                        .parse()
                        .map_err(|e| EngineError::config("enqueue_timeout_ms", format!("{}", e)))?;
                }
                other => {
                    return Err(EngineError::config(
                        other,
                        "unknown configuration key".to_string(),
                    ));
                }
            }
        }
        Ok(config)
    }
}

/// Where the engine reloads its configuration from on [`refresh`]
///
/// [`refresh`]: crate::core::lifecycle::Refreshable::refresh
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<EngineConfig>;
}

/// A TOML file on disk
pub struct TomlFileSource {
    path: PathBuf,
}

impl TomlFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for TomlFileSource {
    fn load(&self) -> Result<EngineConfig> {
        let text = std::fs::read_to_string(&self.path)?;
        EngineConfig::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.pattern, DEFAULT_PATTERN);
        assert_eq!(config.min_level, Level::Info);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.enqueue_timeout(), Duration::from_millis(10));
    }

    #[test]
    fn test_from_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            pattern = "{level} {message-and-error}"
            min_level = "Debug"
            queue_capacity = 64
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.pattern, "{level} {message-and-error}");
        assert_eq!(config.min_level, Level::Debug);
        assert_eq!(config.queue_capacity, 64);
        // Unset fields keep their defaults
        assert_eq!(config.enqueue_timeout_ms, DEFAULT_ENQUEUE_TIMEOUT_MS);
    }

    #[test]
    fn test_from_toml_rejects_unknown_field() {
        let result = EngineConfig::from_toml_str("rotation = \"daily\"");
        assert!(matches!(result, Err(EngineError::Config { .. })));
    }

    #[test]
    fn test_overrides() {
        let overrides = HashMap::from([
            ("pattern".to_string(), "{level}".to_string()),
            ("min_level".to_string(), "ERROR".to_string()),
        ]);

        let config = EngineConfig::default()
            .with_overrides(&overrides)
            .expect("valid overrides");

        assert_eq!(config.pattern, "{level}");
        assert_eq!(config.min_level, Level::Error);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_overrides_reject_unknown_key() {
        let overrides = HashMap::from([("rotation".to_string(), "daily".to_string())]);
        let result = EngineConfig::default().with_overrides(&overrides);
        assert!(matches!(result, Err(EngineError::Config { .. })));
    }

    #[test]
    fn test_overrides_reject_bad_value() {
        let overrides = HashMap::from([("queue_capacity".to_string(), "many".to_string())]);
        let result = EngineConfig::default().with_overrides(&overrides);
        assert!(matches!(result, Err(EngineError::Config { .. })));
    }

    #[test]
    fn test_toml_file_source() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "min_level = \"Warn\"").expect("write config");

        let source = TomlFileSource::new(file.path());
        let config = source.load().expect("loaded");
        assert_eq!(config.min_level, Level::Warn);
    }
}
