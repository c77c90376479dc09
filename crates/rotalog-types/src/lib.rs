//! # Rotalog Types
//!
//! Core types, traits, and enums shared across the rotalog crates.
//!
//! This crate provides:
//!
//! - Error types and result aliases
//! - The `Severity` enumeration
//! - The typed configuration model (`AppenderConfig`, `LoggerConfig`, `ConfigBatch`)
//! - Hierarchical logger-name helpers
//! - The `Destination` trait and the `Record` passed to it
//!
//! ## Example
//!
//! ```
//! use rotalog_types::{ConfigBatch, Severity};
//!
//! let batch = ConfigBatch::from_value(&serde_json::json!({
//!     "appenders": { "Console": { "type": "console" } },
//!     "loggers": { "Root": { "severity": "warning", "appenders": ["Console"] } }
//! }))
//! .unwrap();
//!
//! assert_eq!(batch.loggers[0].severity, Severity::Warning);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod identifiers;
pub mod enums;
pub mod record;
pub mod traits;
pub mod config;

// Re-export common types for convenience
pub use errors::{RotalogError, Result};
pub use identifiers::{destination_id, lineage, Lineage, ROOT_LOGGER};
pub use enums::Severity;
pub use record::Record;
pub use traits::Destination;
pub use config::{AppenderConfig, AppenderKind, ConfigBatch, LoggerConfig, RotationPolicy};
