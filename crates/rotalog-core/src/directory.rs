//! Location of the application's log files.

use once_cell::sync::OnceCell;
use rotalog_types::{RotalogError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// The directory holding every file-backed appender's files.
///
/// The directory is created on first use. A successful creation is remembered
/// for the lifetime of the value; a failed one is retried next time.
#[derive(Debug)]
pub struct LogDirectory {
    path: PathBuf,
    created: OnceCell<()>,
}

impl LogDirectory {
    /// The platform log directory for `application`.
    pub fn for_application(application: &str) -> Self {
        Self::at(platform_log_root().join(application))
    }

    /// A log directory at an explicit path.
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            created: OnceCell::new(),
        }
    }

    /// Path of the directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of `file` inside the directory.
    pub fn file(&self, file: &str) -> PathBuf {
        self.path.join(file)
    }

    /// Create the directory and its parents unless that already succeeded.
    ///
    /// # Errors
    ///
    /// Returns a system error if the directory cannot be created.
    pub fn create(&self) -> Result<()> {
        self.created
            .get_or_try_init(|| {
                fs::create_dir_all(&self.path).map_err(|e| {
                    RotalogError::System(format!(
                        "Can't create log directory '{}': {}",
                        self.path.display(),
                        e
                    ))
                })
            })
            .map(|_| ())
    }
}

/// Root under which applications keep their logs.
///
/// Privileged processes log system-wide, everything else under the user's
/// own directories.
pub fn platform_log_root() -> PathBuf {
    if is_privileged() {
        system_log_root()
    } else {
        user_log_root()
    }
}

#[cfg(unix)]
fn is_privileged() -> bool {
    nix::unistd::Uid::effective().is_root()
}

#[cfg(not(unix))]
fn is_privileged() -> bool {
    false
}

#[cfg(target_os = "macos")]
fn system_log_root() -> PathBuf {
    PathBuf::from("/Library/Logs")
}

#[cfg(windows)]
fn system_log_root() -> PathBuf {
    std::env::var_os("ProgramData")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\ProgramData"))
}

#[cfg(not(any(target_os = "macos", windows)))]
fn system_log_root() -> PathBuf {
    PathBuf::from("/var/log")
}

#[cfg(target_os = "macos")]
fn user_log_root() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("Library").join("Logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("logs"))
}

#[cfg(not(target_os = "macos"))]
fn user_log_root() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("logs")
}
