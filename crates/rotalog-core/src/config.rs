//! Configuration store for appenders and loggers.
//!
//! Configuration arrives in batches. A batch is merged as a whole or not at
//! all: if any entry is malformed or reuses a name already in the store, the
//! store is left exactly as it was.
//!
//! ## Example
//!
//! ```
//! use rotalog_core::config::ConfigStore;
//! use rotalog_types::ConfigBatch;
//!
//! let mut store = ConfigStore::new();
//! let batch = ConfigBatch::from_value(&serde_json::json!({
//!     "appenders": { "Console": { "type": "console" } },
//!     "loggers": {
//!         "Root": { "severity": "info", "appenders": ["Console"] },
//!         "App.Module": { "severity": "debug", "appenders": ["Console"] }
//!     }
//! }))
//! .unwrap();
//! store.merge(batch).unwrap();
//!
//! assert_eq!(store.resolve("App.Module.Class").unwrap().name, "App.Module");
//! assert_eq!(store.resolve("Other").unwrap().name, "Root");
//! ```

use rotalog_types::{
    bail, lineage, AppenderConfig, ConfigBatch, LoggerConfig, RotalogError, Result, ROOT_LOGGER,
};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Every appender and logger declaration merged so far.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    appenders: HashMap<String, AppenderConfig>,
    loggers: HashMap<String, LoggerConfig>,
}

impl ConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch into the store.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the batch declares a name that is
    /// already stored or declares one name twice. Nothing is merged then.
    pub fn merge(&mut self, batch: ConfigBatch) -> Result<()> {
        let mut appenders = HashMap::new();
        for appender in batch.appenders {
            if self.appenders.contains_key(&appender.name) || appenders.contains_key(&appender.name) {
                bail!(Config, "Appender '{}' already exists.", appender.name);
            }
            appenders.insert(appender.name.clone(), appender);
        }

        let mut loggers = HashMap::new();
        for logger in batch.loggers {
            if self.loggers.contains_key(&logger.name) || loggers.contains_key(&logger.name) {
                bail!(Config, "Logger '{}' already exists.", logger.name);
            }
            loggers.insert(logger.name.clone(), logger);
        }

        info!(
            "Merged configuration: {} appender(s), {} logger(s)",
            appenders.len(),
            loggers.len()
        );

        self.appenders.extend(appenders);
        self.loggers.extend(loggers);
        Ok(())
    }

    /// Look up an appender by name.
    pub fn appender(&self, name: &str) -> Option<&AppenderConfig> {
        self.appenders.get(name)
    }

    /// Look up a logger by its exact name.
    pub fn logger(&self, name: &str) -> Option<&LoggerConfig> {
        self.loggers.get(name)
    }

    /// Find the configuration governing `identifier`.
    ///
    /// Tries the identifier itself, then each ancestor obtained by dropping
    /// the last dot-separated segment, then the root logger.
    pub fn resolve(&self, identifier: &str) -> Option<&LoggerConfig> {
        lineage(identifier)
            .find_map(|candidate| self.loggers.get(candidate))
            .or_else(|| self.loggers.get(ROOT_LOGGER))
    }

    /// Number of stored appenders.
    pub fn appender_count(&self) -> usize {
        self.appenders.len()
    }

    /// Number of stored loggers.
    pub fn logger_count(&self) -> usize {
        self.loggers.len()
    }
}

/// Load a raw configuration tree from a file.
///
/// Files ending in `.yml` or `.yaml` are read as YAML, everything else as JSON.
///
/// # Errors
///
/// Returns a system error if the file cannot be read and a JSON or YAML
/// error if it cannot be parsed.
pub fn load_config_file(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| {
        RotalogError::System(format!("Failed to load data from '{}': {}", path.display(), e))
    })?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("yml") || e.eq_ignore_ascii_case("yaml"));

    let tree = if is_yaml {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    debug!("Loaded configuration from {}", path.display());
    Ok(tree)
}
