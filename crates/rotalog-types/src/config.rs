//! Configuration types and structures.
//!
//! A configuration batch is a case-sensitive object with two optional sections:
//!
//! ```json
//! {
//!     "appenders": {
//!         "Console": { "type": "console" },
//!         "Plain":   { "type": "file", "file": "output.log" },
//!         "Rolling": { "type": "rollFile", "file": "app.log", "maxSize": 1048576, "maxCount": 10 }
//!     },
//!     "loggers": {
//!         "Root": { "severity": "info", "appenders": ["Console"] }
//!     }
//! }
//! ```
//!
//! The raw tree is parsed once into [`ConfigBatch`]; everything downstream works
//! with the typed values.

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use crate::errors::{RotalogError, Result};
use crate::Severity;

const APPENDERS_KEY: &str = "appenders";
const LOGGERS_KEY: &str = "loggers";

/// Default size above which a rolling file is rotated (1 MiB).
pub const DEFAULT_MAX_SIZE: u64 = 1_048_576;

/// Default number of files kept by a rolling appender, active file included.
pub const DEFAULT_MAX_COUNT: u32 = 10;

/// When and how deep a rolling file is rotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationPolicy {
    /// Size in bytes the active file may reach before it is rotated
    pub max_size: u64,
    /// Number of files kept, the active one included. History files are
    /// numbered `1 ..= max_count - 1`.
    pub max_count: u32,
}

impl RotationPolicy {
    /// Create a policy from explicit limits.
    pub fn new(max_size: u64, max_count: u32) -> Self {
        Self { max_size, max_count }
    }
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE, DEFAULT_MAX_COUNT)
    }
}

/// The kind of output an appender produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AppenderKind {
    /// Standard error of the process
    Console,
    /// Plain file inside the log directory
    File {
        /// File name relative to the log directory
        file: String,
    },
    /// File inside the log directory rotated by size
    #[serde(rename_all = "camelCase")]
    RollFile {
        /// File name relative to the log directory
        file: String,
        /// Size in bytes above which the file is rotated
        #[serde(deserialize_with = "whole_number")]
        max_size: u64,
        /// Number of files kept, the active one included
        #[serde(deserialize_with = "whole_number")]
        max_count: u32,
    },
}

impl AppenderKind {
    /// File name for file-backed kinds.
    pub fn file(&self) -> Option<&str> {
        match self {
            AppenderKind::Console => None,
            AppenderKind::File { file } | AppenderKind::RollFile { file, .. } => Some(file),
        }
    }

    /// Rotation limits for the rolling kind.
    pub fn rotation(&self) -> Option<RotationPolicy> {
        match self {
            AppenderKind::RollFile { max_size, max_count, .. } => {
                Some(RotationPolicy::new(*max_size, *max_count))
            }
            _ => None,
        }
    }
}

/// A named appender declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppenderConfig {
    /// Unique name within a configuration store
    pub name: String,
    /// What the appender writes to
    #[serde(flatten)]
    pub kind: AppenderKind,
}

impl AppenderConfig {
    /// Create an appender declaration.
    pub fn new(name: impl Into<String>, kind: AppenderKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Parse the body of an `appenders` entry.
    pub fn from_value(name: &str, data: &Value) -> Result<Self> {
        if !data.is_object() {
            return Err(RotalogError::Config(format!(
                "Invalid data type for appender '{}'",
                name
            )));
        }

        let kind = AppenderKind::deserialize(data).map_err(|e| {
            RotalogError::Config(format!("Invalid configuration for appender '{}': {}", name, e))
        })?;

        Ok(Self::new(name, kind))
    }
}

#[derive(Deserialize)]
struct LoggerBody {
    severity: Severity,
    appenders: Vec<String>,
}

/// A named logger declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggerConfig {
    /// Dot-hierarchical name, unique within a configuration store
    pub name: String,
    /// Minimum severity emitted by the logger's destinations
    pub severity: Severity,
    /// Appender names activated by this logger, in order
    pub appenders: Vec<String>,
}

impl LoggerConfig {
    /// Create a logger declaration.
    pub fn new<I, S>(name: impl Into<String>, severity: Severity, appenders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            severity,
            appenders: appenders.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the body of a `loggers` entry.
    pub fn from_value(name: &str, data: &Value) -> Result<Self> {
        if !data.is_object() {
            return Err(RotalogError::Config(format!(
                "Invalid data type for logger '{}'",
                name
            )));
        }

        let body = LoggerBody::deserialize(data).map_err(|e| {
            RotalogError::Config(format!("Invalid configuration for logger '{}': {}", name, e))
        })?;

        Ok(Self {
            name: name.to_string(),
            severity: body.severity,
            appenders: body.appenders,
        })
    }
}

/// A fully parsed configuration batch, ready to be merged into a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigBatch {
    /// Appender declarations
    pub appenders: Vec<AppenderConfig>,
    /// Logger declarations
    pub loggers: Vec<LoggerConfig>,
}

impl ConfigBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an appender declaration.
    pub fn with_appender(mut self, appender: AppenderConfig) -> Self {
        self.appenders.push(appender);
        self
    }

    /// Add a logger declaration.
    pub fn with_logger(mut self, logger: LoggerConfig) -> Self {
        self.loggers.push(logger);
        self
    }

    /// Whether the batch declares nothing.
    pub fn is_empty(&self) -> bool {
        self.appenders.is_empty() && self.loggers.is_empty()
    }

    /// Parse a raw configuration tree.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first offending section or
    /// entry. Nothing is returned for a partially valid tree.
    pub fn from_value(tree: &Value) -> Result<Self> {
        let root = tree.as_object().ok_or_else(|| {
            RotalogError::Config("Configuration is not an object".to_string())
        })?;

        let mut batch = Self::new();

        if let Some(section) = root.get(APPENDERS_KEY) {
            let entries = section.as_object().ok_or_else(|| {
                RotalogError::Config(format!("Invalid '{}' data type", APPENDERS_KEY))
            })?;

            for (name, data) in entries {
                batch.appenders.push(AppenderConfig::from_value(name, data)?);
            }
        }

        if let Some(section) = root.get(LOGGERS_KEY) {
            let entries = section.as_object().ok_or_else(|| {
                RotalogError::Config(format!("Invalid '{}' data type", LOGGERS_KEY))
            })?;

            for (name, data) in entries {
                batch.loggers.push(LoggerConfig::from_value(name, data)?);
            }
        }

        Ok(batch)
    }
}

/// Accepts integers and floats without a fractional part (`1024` or `1024.0`).
fn whole_number<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    struct WholeNumber;

    impl<'de> Visitor<'de> for WholeNumber {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative whole number")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<u64, E> {
            u64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<u64, E> {
            if v.fract() == 0.0 && v >= 0.0 && v <= u64::MAX as f64 {
                Ok(v as u64)
            } else {
                Err(E::invalid_value(Unexpected::Float(v), &self))
            }
        }
    }

    let value = deserializer.deserialize_any(WholeNumber)?;
    T::try_from(value).map_err(|_| {
        <D::Error as de::Error>::invalid_value(Unexpected::Unsigned(value), &"a number in range")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_batch() {
        let tree = json!({
            "appenders": {
                "Console": { "type": "console" },
                "Plain": { "type": "file", "file": "output.log" },
                "Rolling": { "type": "rollFile", "file": "app.log", "maxSize": 1024, "maxCount": 3 }
            },
            "loggers": {
                "Root": { "severity": "debug", "appenders": ["Console", "Rolling"] }
            }
        });

        let batch = ConfigBatch::from_value(&tree).unwrap();
        assert_eq!(batch.appenders.len(), 3);
        assert_eq!(batch.loggers.len(), 1);

        let rolling = batch.appenders.iter().find(|a| a.name == "Rolling").unwrap();
        assert_eq!(rolling.kind.file(), Some("app.log"));
        assert_eq!(rolling.kind.rotation(), Some(RotationPolicy::new(1024, 3)));

        let console = batch.appenders.iter().find(|a| a.name == "Console").unwrap();
        assert_eq!(console.kind, AppenderKind::Console);
        assert_eq!(console.kind.rotation(), None);

        let root = &batch.loggers[0];
        assert_eq!(root.severity, Severity::Debug);
        assert_eq!(root.appenders, vec!["Console", "Rolling"]);
    }

    #[test]
    fn test_sections_are_optional() {
        let batch = ConfigBatch::from_value(&json!({})).unwrap();
        assert!(batch.is_empty());

        let batch = ConfigBatch::from_value(&json!({
            "loggers": { "App": { "severity": "error", "appenders": [] } }
        }))
        .unwrap();
        assert!(batch.appenders.is_empty());
        assert_eq!(batch.loggers.len(), 1);
    }

    #[test]
    fn test_rejects_non_object_tree() {
        assert!(ConfigBatch::from_value(&json!([1, 2])).unwrap_err().is_config());
        assert!(ConfigBatch::from_value(&json!({ "appenders": [] })).unwrap_err().is_config());
        assert!(ConfigBatch::from_value(&json!({ "loggers": "Root" })).unwrap_err().is_config());
    }

    #[test]
    fn test_rejects_invalid_appenders() {
        let cases = [
            json!({ "A": "console" }),
            json!({ "A": {} }),
            json!({ "A": { "type": "syslog" } }),
            json!({ "A": { "type": 7 } }),
            json!({ "A": { "type": "file" } }),
            json!({ "A": { "type": "rollFile", "file": "a.log", "maxCount": 3 } }),
            json!({ "A": { "type": "rollFile", "file": "a.log", "maxSize": "big", "maxCount": 3 } }),
            json!({ "A": { "type": "rollFile", "file": "a.log", "maxSize": 10.5, "maxCount": 3 } }),
            json!({ "A": { "type": "rollFile", "file": "a.log", "maxSize": -1, "maxCount": 3 } }),
            json!({ "A": { "type": "rollFile", "file": "a.log", "maxSize": 10, "maxCount": 5000000000u64 } }),
        ];

        for appenders in cases {
            let err = ConfigBatch::from_value(&json!({ "appenders": appenders })).unwrap_err();
            assert!(err.is_config(), "expected config error, got {}", err);
            assert!(err.to_string().contains("'A'"));
        }
    }

    #[test]
    fn test_rotation_limits_accept_whole_floats() {
        let batch = ConfigBatch::from_value(&json!({
            "appenders": {
                "Rolling": { "type": "rollFile", "file": "app.log", "maxSize": 1024.0, "maxCount": 3.0 }
            }
        }))
        .unwrap();

        assert_eq!(batch.appenders[0].kind.rotation(), Some(RotationPolicy::new(1024, 3)));
    }

    #[test]
    fn test_rejects_invalid_loggers() {
        let cases = [
            json!({ "L": { "appenders": [] } }),
            json!({ "L": { "severity": 3, "appenders": [] } }),
            json!({ "L": { "severity": "info" } }),
            json!({ "L": { "severity": "info", "appenders": "Console" } }),
            json!({ "L": { "severity": "info", "appenders": [1] } }),
        ];

        for loggers in cases {
            let err = ConfigBatch::from_value(&json!({ "loggers": loggers })).unwrap_err();
            assert!(err.is_config(), "expected config error, got {}", err);
        }
    }

    #[test]
    fn test_unknown_severity_defaults_to_info() {
        let batch = ConfigBatch::from_value(&json!({
            "loggers": { "L": { "severity": "verbose", "appenders": [] } }
        }))
        .unwrap();
        assert_eq!(batch.loggers[0].severity, Severity::Info);
    }

    #[test]
    fn test_default_rotation_policy() {
        let policy = RotationPolicy::default();
        assert_eq!(policy.max_size, 1_048_576);
        assert_eq!(policy.max_count, 10);
    }
}
