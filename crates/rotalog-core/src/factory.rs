//! Logger factory resolving hierarchical names against the configuration.
//!
//! Configuration is appended in batches, each merged under an exclusive lock;
//! logger creation only takes a shared lock, so loggers can be created from
//! many threads at once and never observe a half-merged batch.
//!
//! When asked for `App.Module.Class`, the factory uses the configuration of
//! the nearest declared ancestor (`App.Module.Class`, `App.Module`, `App`),
//! falling back to `Root`. The logger keeps the requested identifier.

use crate::config::{load_config_file, ConfigStore};
use crate::destination::build_destination;
use crate::diagnostics::{Diagnostics, DiagnosticsSnapshot};
use crate::directory::LogDirectory;
use crate::logger::Logger;
use crate::registry::AppenderRegistry;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rotalog_types::{ConfigBatch, Result};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Creates loggers from appended configuration.
pub struct LoggerFactory {
    directory: LogDirectory,
    registry: AppenderRegistry,
    config: RwLock<ConfigStore>,
    diagnostics: Arc<Diagnostics>,
}

impl LoggerFactory {
    /// Create a factory logging into the platform log directory of `application`.
    pub fn new(application: &str) -> Self {
        Self::with_log_directory(LogDirectory::for_application(application))
    }

    /// Create a factory logging into `path`.
    pub fn with_directory(path: impl AsRef<Path>) -> Self {
        Self::with_log_directory(LogDirectory::at(path))
    }

    /// Create a factory logging into `directory`.
    pub fn with_log_directory(directory: LogDirectory) -> Self {
        let diagnostics = Arc::new(Diagnostics::new());
        Self {
            directory,
            registry: AppenderRegistry::with_diagnostics(diagnostics.clone()),
            config: RwLock::new(ConfigStore::new()),
            diagnostics,
        }
    }

    /// The process-wide factory, named after the running executable.
    pub fn global() -> &'static LoggerFactory {
        static INSTANCE: Lazy<LoggerFactory> =
            Lazy::new(|| LoggerFactory::new(&application_name()));
        &INSTANCE
    }

    /// Directory holding the log files, e.g. for bundling into crash reports.
    pub fn log_directory(&self) -> &Path {
        self.directory.path()
    }

    /// Append configuration from a raw tree.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any entry is invalid or already
    /// declared; nothing from the tree is kept then.
    pub fn append_configuration(&self, tree: &Value) -> Result<()> {
        let batch = ConfigBatch::from_value(tree)?;
        self.merge(batch)
    }

    /// Append configuration from a JSON or YAML file.
    ///
    /// # Errors
    ///
    /// Returns a system error if the file cannot be read, and a configuration
    /// error if its content is invalid.
    pub fn append_configuration_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let tree = load_config_file(path)?;
        self.append_configuration(&tree)
    }

    /// Merge an already parsed batch.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a name is already declared.
    pub fn merge(&self, batch: ConfigBatch) -> Result<()> {
        self.config.write().merge(batch)
    }

    /// Create a logger for `identifier`.
    ///
    /// Never fails: unknown appender names and destinations that cannot be
    /// built are left out (and counted in [`diagnostics`](Self::diagnostics)),
    /// and an identifier without any matching configuration yields a logger
    /// with no destinations.
    pub fn create_logger(&self, identifier: &str) -> Logger {
        let mut logger = Logger::new(identifier);
        let config = self.config.read();

        let Some(logger_config) = config.resolve(identifier) else {
            debug!("No configuration for logger '{}'", identifier);
            return logger;
        };

        for name in &logger_config.appenders {
            let Some(appender) = config.appender(name) else {
                self.diagnostics.record_missing_appender();
                warn!("Logger '{}' references unknown appender '{}'", logger_config.name, name);
                continue;
            };

            match build_destination(appender, logger_config, &self.directory, &self.registry) {
                Ok(destination) => logger.add_destination(destination),
                Err(e) => {
                    self.diagnostics.record_skipped_destination();
                    warn!(
                        "Skipping appender '{}' for logger '{}': {}",
                        name, identifier, e
                    );
                }
            }
        }

        debug!(
            "Created logger '{}' from '{}' with {} destination(s)",
            identifier,
            logger_config.name,
            logger.destination_count()
        );
        logger
    }

    /// Counters of everything logger creation and rotation swallowed.
    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    /// Number of files currently held open by this factory's appenders.
    pub fn open_file_count(&self) -> usize {
        self.registry.live_count()
    }
}

fn application_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .unwrap_or_else(|| crate::APP_NAME.to_string())
}
