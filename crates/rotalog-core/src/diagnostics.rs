//! Counters for conditions that are swallowed instead of reported.
//!
//! Logger creation and rotation never fail outward. Whatever they absorb is
//! counted here so operators can still see it.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by a factory, its registry, and every appender it opens.
#[derive(Debug, Default)]
pub struct Diagnostics {
    missing_appenders: AtomicU64,
    skipped_destinations: AtomicU64,
    rotations: AtomicU64,
    rotation_discards: AtomicU64,
    dropped_writes: AtomicU64,
}

/// Point-in-time copy of [`Diagnostics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticsSnapshot {
    /// Logger configs referencing an appender name that was never declared
    pub missing_appenders: u64,
    /// Destinations whose construction failed and were left out of a logger
    pub skipped_destinations: u64,
    /// Completed rotations
    pub rotations: u64,
    /// Rotations that discarded the active file instead of keeping it as history
    pub rotation_discards: u64,
    /// Writes lost because the file could not be written or reopened
    pub dropped_writes: u64,
}

impl Diagnostics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_missing_appender(&self) {
        self.missing_appenders.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped_destination(&self) {
        self.skipped_destinations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rotation(&self) {
        self.rotations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rotation_discard(&self) {
        self.rotation_discards.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped_write(&self) {
        self.dropped_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter.
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            missing_appenders: self.missing_appenders.load(Ordering::Relaxed),
            skipped_destinations: self.skipped_destinations.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
            rotation_discards: self.rotation_discards.load(Ordering::Relaxed),
            dropped_writes: self.dropped_writes.load(Ordering::Relaxed),
        }
    }
}
