//! Registry deduplicating appenders per file path.

use crate::appender::RotatingAppender;
use crate::diagnostics::Diagnostics;
use parking_lot::Mutex;
use rotalog_types::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Maps absolute file paths to the appender currently writing them.
///
/// Entries are weak: the registry never keeps an appender alive. Once every
/// destination holding an appender is gone, the next lookup for its path opens
/// a fresh appender, which continues the file in append mode.
pub struct AppenderRegistry {
    appenders: Mutex<HashMap<PathBuf, Weak<RotatingAppender>>>,
    diagnostics: Arc<Diagnostics>,
}

impl AppenderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::with_diagnostics(Arc::new(Diagnostics::new()))
    }

    /// Create an empty registry whose appenders report into `diagnostics`.
    pub fn with_diagnostics(diagnostics: Arc<Diagnostics>) -> Self {
        Self {
            appenders: Mutex::new(HashMap::new()),
            diagnostics,
        }
    }

    /// Get the live appender for `path`, opening one if there is none.
    ///
    /// Relative paths are resolved against the current directory, so two
    /// spellings of the same file share one appender.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn appender_for(&self, path: impl AsRef<Path>) -> Result<Arc<RotatingAppender>> {
        let path = absolute(path.as_ref())?;

        if let Some(existing) = self.live(&path) {
            return Ok(existing);
        }

        // Opened without the lock held; a racing lookup may have won meanwhile.
        let opened = Arc::new(RotatingAppender::open_with(&path, self.diagnostics.clone())?);

        let winner = {
            let mut appenders = self.appenders.lock();
            match appenders.get(&path).and_then(Weak::upgrade) {
                Some(existing) => existing,
                None => {
                    appenders.retain(|_, entry| entry.strong_count() > 0);
                    appenders.insert(path, Arc::downgrade(&opened));
                    debug!("Registered appender for {}", opened.path().display());
                    opened.clone()
                }
            }
        };

        // A losing appender is dropped here, after the lock is released.
        drop(opened);
        Ok(winner)
    }

    fn live(&self, path: &Path) -> Option<Arc<RotatingAppender>> {
        self.appenders.lock().get(path).and_then(Weak::upgrade)
    }

    /// Number of paths with a live appender.
    pub fn live_count(&self) -> usize {
        self.appenders
            .lock()
            .values()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }
}

impl Default for AppenderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
