//! Core trait definitions for rotalog abstractions.

use crate::{Record, Severity};

/// An output sink attached to a logger.
///
/// Destinations are shared between threads. File-backed implementations
/// delegate the actual I/O to a shared appender and never hold a file handle
/// of their own.
pub trait Destination: Send + Sync {
    /// Identifier of the destination, `logger.appender` for configured ones.
    fn identifier(&self) -> &str;

    /// Minimum severity this destination emits.
    fn output_level(&self) -> Severity;

    /// Whether a record at `level` would be emitted.
    fn is_enabled(&self, level: Severity) -> bool {
        self.output_level().admits(level)
    }

    /// Emit a record. Records below the output level are ignored.
    fn output(&self, record: &Record<'_>);

    /// Block until everything emitted so far has reached its sink.
    fn flush(&self) {}
}
