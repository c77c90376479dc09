//! Loggers produced by the factory.

use rotalog_types::{Destination, Record, Severity};
use std::panic::Location;
use std::sync::Arc;

/// A named logger forwarding records to its destinations.
///
/// A logger may have no destinations at all; logging through it is then a
/// no-op.
///
/// # Example
///
/// ```
/// use rotalog_core::Logger;
///
/// let logger = Logger::new("App.Module");
/// logger.info("nothing is attached, so nothing is written");
/// assert_eq!(logger.destination_count(), 0);
/// ```
#[derive(Clone)]
pub struct Logger {
    identifier: String,
    destinations: Vec<Arc<dyn Destination>>,
}

impl Logger {
    /// Create a logger without destinations.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            destinations: Vec::new(),
        }
    }

    /// The identifier the logger was requested with.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Attach a destination.
    pub fn add_destination(&mut self, destination: Arc<dyn Destination>) {
        self.destinations.push(destination);
    }

    /// Attached destinations, in attachment order.
    pub fn destinations(&self) -> &[Arc<dyn Destination>] {
        &self.destinations
    }

    /// Number of attached destinations.
    pub fn destination_count(&self) -> usize {
        self.destinations.len()
    }

    /// Whether any destination would emit a record at `level`.
    pub fn is_enabled(&self, level: Severity) -> bool {
        level != Severity::None && self.destinations.iter().any(|d| d.is_enabled(level))
    }

    /// Log `message` at `level`, recording the caller's location.
    #[track_caller]
    pub fn log(&self, level: Severity, message: impl AsRef<str>) {
        if !self.is_enabled(level) {
            return;
        }

        let record = Record::new(level, &self.identifier, message.as_ref())
            .with_location(Location::caller());

        for destination in &self.destinations {
            destination.output(&record);
        }
    }

    /// Log a fatal error.
    #[track_caller]
    pub fn fatal(&self, message: impl AsRef<str>) {
        self.log(Severity::Fatal, message);
    }

    /// Log an error.
    #[track_caller]
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(Severity::Error, message);
    }

    /// Log a warning.
    #[track_caller]
    pub fn warning(&self, message: impl AsRef<str>) {
        self.log(Severity::Warning, message);
    }

    /// Log info.
    #[track_caller]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(Severity::Info, message);
    }

    /// Log debug.
    #[track_caller]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(Severity::Debug, message);
    }

    /// Log detail.
    #[track_caller]
    pub fn detail(&self, message: impl AsRef<str>) {
        self.log(Severity::Detail, message);
    }

    /// Block until every destination has written what it was given.
    pub fn flush(&self) {
        for destination in &self.destinations {
            destination.flush();
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let destinations: Vec<&str> = self.destinations.iter().map(|d| d.identifier()).collect();
        f.debug_struct("Logger")
            .field("identifier", &self.identifier)
            .field("destinations", &destinations)
            .finish()
    }
}
