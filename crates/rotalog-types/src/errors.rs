//! Error types for rotalog operations.

use thiserror::Error;

/// The main error type for rotalog operations.
///
/// Configuration errors are reported to whoever appends configuration and
/// leave the store untouched. System errors come from the filesystem: reading
/// a configuration file, creating the log directory, opening a log file.
#[derive(Error, Debug)]
pub enum RotalogError {
    /// Malformed, missing, or conflicting configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or platform failure outside of configuration parsing
    #[error("System error: {0}")]
    System(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl RotalogError {
    /// Whether this error was caused by the configuration rather than the system.
    ///
    /// Unparseable JSON or YAML counts as a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            RotalogError::Config(_) | RotalogError::Json(_) | RotalogError::Yaml(_)
        )
    }
}

/// A specialized Result type for rotalog operations.
pub type Result<T> = std::result::Result<T, RotalogError>;

/// Helper macro to bail out with a RotalogError
///
/// This is used for expected error conditions.
///
/// # Example
///
/// ```ignore
/// if !valid {
///     bail!(Config, "Appender '{}' already exists.", name);
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($variant:ident, $msg:expr) => {
        return Err($crate::RotalogError::$variant($msg.to_string()))
    };
    ($variant:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::RotalogError::$variant(format!($fmt, $($arg)*)))
    };
    ($msg:expr) => {
        return Err($crate::RotalogError::Other($msg.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::RotalogError::Other(format!($fmt, $($arg)*)))
    };
}
