//! Common enumerations used throughout rotalog.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::errors::{RotalogError, Result};

/// Severity of a log record, and the minimum severity a destination emits.
///
/// Ordered from most verbose to least. `None` sorts above every real
/// severity, so a destination configured with `None` emits nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Detailed trace messages
    Detail,
    /// Debug messages
    Debug,
    /// Informational messages
    Info,
    /// Warnings
    Warning,
    /// Errors
    Error,
    /// Unrecoverable failures
    Fatal,
    /// No logging
    None,
}

impl Severity {
    /// All severities a record can carry, most verbose first.
    pub const RECORD_LEVELS: [Severity; 6] = [
        Severity::Detail,
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Fatal,
    ];

    /// Parse a configuration severity, falling back to `Info` for
    /// unrecognized values.
    pub fn from_config(value: &str) -> Self {
        value.parse().unwrap_or(Severity::Info)
    }

    /// Whether a record at `level` passes a threshold of `self`.
    pub fn admits(self, level: Severity) -> bool {
        self != Severity::None && level >= self
    }

    /// Configuration spelling of this severity.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Detail => "detail",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
            Severity::None => "none",
        }
    }
}

impl FromStr for Severity {
    type Err = RotalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Severity::None),
            "fatal" => Ok(Severity::Fatal),
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            "debug" => Ok(Severity::Debug),
            "detail" => Ok(Severity::Detail),
            _ => Err(RotalogError::Config(format!("Invalid severity: {}", s))),
        }
    }
}

// Unknown strings are not an error in configuration files, but a non-string is.
impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Severity::from_config(&value))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Detail => write!(f, "Detail"),
            Severity::Debug => write!(f, "Debug"),
            Severity::Info => write!(f, "Info"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Error => write!(f, "Error"),
            Severity::Fatal => write!(f, "Fatal"),
            Severity::None => write!(f, "None"),
        }
    }
}
