//! # Rotalog Core
//!
//! Shared rotating file appenders and a configuration-driven logger factory.
//!
//! This crate provides:
//!
//! - **Appenders**: one writer thread per file, size-triggered rotation with
//!   a bounded history
//! - **Registry**: at most one live appender per path, shared by every
//!   destination writing that path
//! - **Configuration**: transactional merging of appender and logger batches
//! - **Factory**: loggers resolved by hierarchical name with `Root` fallback
//! - **Diagnostics**: counters for everything swallowed on the way
//!
//! ## Example
//!
//! ```no_run
//! use rotalog_core::LoggerFactory;
//!
//! let factory = LoggerFactory::new("MyApp");
//! factory.append_configuration(&serde_json::json!({
//!     "appenders": {
//!         "Rolling": { "type": "rollFile", "file": "app.log", "maxSize": 1048576, "maxCount": 10 }
//!     },
//!     "loggers": {
//!         "Root": { "severity": "info", "appenders": ["Rolling"] }
//!     }
//! }))?;
//!
//! let logger = factory.create_logger("MyApp.Network.Client");
//! logger.info("connected");
//! # Ok::<(), rotalog_types::RotalogError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod appender;
pub mod config;
pub mod destination;
pub mod diagnostics;
pub mod directory;
pub mod factory;
pub mod log;
pub mod logger;
pub mod registry;

// Re-export commonly used items
pub use appender::RotatingAppender;
pub use config::ConfigStore;
pub use destination::{ConsoleDestination, FileDestination, LineFormat};
pub use diagnostics::{Diagnostics, DiagnosticsSnapshot};
pub use directory::LogDirectory;
pub use factory::LoggerFactory;
pub use logger::Logger;
pub use registry::AppenderRegistry;
pub use rotalog_types::{RotalogError, Result, Severity};

/// Application name used when the executable name cannot be determined
pub const APP_NAME: &str = "rotalog";
