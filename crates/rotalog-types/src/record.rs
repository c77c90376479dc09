//! Log records passed from loggers to destinations.

use chrono::{DateTime, Local};
use std::panic::Location;
use crate::Severity;

/// A single log event.
#[derive(Debug, Clone)]
pub struct Record<'a> {
    /// When the event was created
    pub timestamp: DateTime<Local>,
    /// Severity of the event
    pub level: Severity,
    /// Identifier of the logger that produced the event
    pub logger: &'a str,
    /// The log message
    pub message: &'a str,
    /// Source file of the call site
    pub file: Option<&'static str>,
    /// Source line of the call site
    pub line: Option<u32>,
}

impl<'a> Record<'a> {
    /// Create a record stamped with the current local time.
    pub fn new(level: Severity, logger: &'a str, message: &'a str) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            logger,
            message,
            file: None,
            line: None,
        }
    }

    /// Builder-style method for setting the call site.
    pub fn with_location(mut self, location: &'static Location<'static>) -> Self {
        self.file = Some(location.file());
        self.line = Some(location.line());
        self
    }

    /// File name of the call site, without its directories.
    pub fn file_name(&self) -> Option<&'static str> {
        self.file
            .map(|file| file.rsplit(['/', '\\']).next().unwrap_or(file))
    }
}
