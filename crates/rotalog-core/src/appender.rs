//! Single-writer file appender with size-triggered rotation.
//!
//! A [`RotatingAppender`] owns one file. Every write is handed to a dedicated
//! worker thread through an unbounded channel, so writes from any number of
//! threads reach the file one at a time and in the order they were enqueued.
//! The rotation check runs on the same worker, right after the write that
//! triggered it.
//!
//! ## Rotation layout
//!
//! For `app.log` with `max_count = 4`:
//!
//! ```text
//! app.log   active file
//! app1.log  newest history
//! app2.log
//! app3.log  oldest history, evicted by the next rotation
//! ```

use crate::diagnostics::Diagnostics;
use rotalog_types::{RotalogError, Result, RotationPolicy};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc as sync_mpsc, Arc};
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Number of rotating writes between two file-size checks.
pub const WRITES_BETWEEN_ROTATION_CHECK: u32 = 10;

enum Command {
    Write(Vec<u8>),
    WriteAndRotate(Vec<u8>, RotationPolicy),
    Flush(sync_mpsc::SyncSender<()>),
}

/// Appender writing to a single file path, shared by every destination using that path.
///
/// Dropping the appender blocks until every queued write has reached the file.
pub struct RotatingAppender {
    path: PathBuf,
    sender: Option<mpsc::UnboundedSender<Command>>,
    worker: Option<JoinHandle<()>>,
}

impl RotatingAppender {
    /// Open `path` for appending, creating the file if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns a system error if the file cannot be opened for writing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, Arc::new(Diagnostics::new()))
    }

    pub(crate) fn open_with(path: impl AsRef<Path>, diagnostics: Arc<Diagnostics>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = open_log_file(&path).map_err(|e| {
            RotalogError::System(format!("Can't open log file '{}': {}", path.display(), e))
        })?;

        let (sender, receiver) = mpsc::unbounded_channel();
        let writer = FileWriter {
            path: path.clone(),
            file: Some(file),
            writes: 0,
            reopen_failed: false,
            diagnostics,
        };

        let worker = thread::Builder::new()
            .name(format!("rotalog:{}", path.display()))
            .spawn(move || writer.run(receiver))?;

        debug!("Opened log file {}", path.display());

        Ok(Self {
            path,
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Path of the active file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queue `data` to be appended to the file.
    pub fn write(&self, data: impl Into<Vec<u8>>) {
        self.send(Command::Write(data.into()));
    }

    /// Queue `data` to be appended, then check the file against `policy`.
    pub fn write_with_rotation(&self, data: impl Into<Vec<u8>>, policy: RotationPolicy) {
        self.send(Command::WriteAndRotate(data.into(), policy));
    }

    /// Block until every write queued before this call has been applied.
    pub fn flush(&self) {
        let (ack, done) = sync_mpsc::sync_channel(1);
        if self.send(Command::Flush(ack)) {
            let _ = done.recv();
        }
    }

    fn send(&self, command: Command) -> bool {
        match &self.sender {
            Some(sender) => sender.send(command).is_ok(),
            None => false,
        }
    }
}

impl std::fmt::Debug for RotatingAppender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingAppender")
            .field("path", &self.path)
            .finish()
    }
}

impl Drop for RotatingAppender {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain what is queued and exit.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Writer for {} panicked", self.path.display());
            }
        }
    }
}

/// State owned by the worker thread.
struct FileWriter {
    path: PathBuf,
    file: Option<File>,
    writes: u32,
    reopen_failed: bool,
    diagnostics: Arc<Diagnostics>,
}

impl FileWriter {
    fn run(mut self, mut receiver: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = receiver.blocking_recv() {
            match command {
                Command::Write(data) => self.write(&data),
                Command::WriteAndRotate(data, policy) => {
                    self.write(&data);
                    self.check_and_rotate(policy);
                }
                Command::Flush(ack) => {
                    self.flush();
                    let _ = ack.send(());
                }
            }
        }

        self.flush();
        debug!("Closed log file {}", self.path.display());
    }

    fn write(&mut self, data: &[u8]) {
        if self.file.is_none() {
            self.reopen();
        }

        let Some(file) = self.file.as_mut() else {
            self.diagnostics.record_dropped_write();
            return;
        };

        if let Err(e) = file.write_all(data) {
            self.diagnostics.record_dropped_write();
            warn!("Failed to write to {}: {}", self.path.display(), e);
        }
    }

    fn flush(&mut self) {
        if let Some(file) = self.file.as_mut() {
            let _ = file.flush();
        }
    }

    fn check_and_rotate(&mut self, policy: RotationPolicy) {
        self.writes += 1;
        if self.writes < WRITES_BETWEEN_ROTATION_CHECK {
            return;
        }
        self.writes = 0;

        let size = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        if size > policy.max_size {
            self.rotate(policy.max_count);
        }
    }

    fn rotate(&mut self, max_count: u32) {
        // Close the active handle before its file is renamed.
        self.file = None;

        if max_count < 2 {
            discard_active(&self.path);
            self.diagnostics.record_rotation();
            debug!("Discarded {} (no history kept)", self.path.display());
        } else {
            match rotate_files(&self.path, max_count) {
                Ok(()) => {
                    self.diagnostics.record_rotation();
                    info!("Rotated {}", self.path.display());
                }
                Err(e) => {
                    discard_active(&self.path);
                    self.diagnostics.record_rotation_discard();
                    warn!(
                        "Rotation of {} failed ({}); active file discarded",
                        self.path.display(),
                        e
                    );
                }
            }
        }

        self.reopen();
    }

    // Warns once per outage; every write retries until the file opens again.
    fn reopen(&mut self) {
        match open_log_file(&self.path) {
            Ok(file) => {
                if self.reopen_failed {
                    info!("Reopened {}", self.path.display());
                }
                self.file = Some(file);
                self.reopen_failed = false;
            }
            Err(e) => {
                if !self.reopen_failed {
                    warn!("Failed to reopen {}: {}", self.path.display(), e);
                }
                self.reopen_failed = true;
            }
        }
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Path of history file `index` for the active file at `path`.
///
/// `logs/app.log` with index 2 becomes `logs/app2.log`.
pub fn history_path(path: &Path, index: u32) -> PathBuf {
    let mut name = path.file_stem().map(OsString::from).unwrap_or_default();
    name.push(index.to_string());
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

/// Shift the history of `path` up by one slot and move the active file to slot 1.
///
/// The oldest slot (`max_count - 1`) is evicted first so every rename has a
/// free destination. Missing history files are skipped.
fn rotate_files(path: &Path, max_count: u32) -> io::Result<()> {
    let mut destination = history_path(path, max_count - 1);
    ignore_missing(fs::remove_file(&destination))?;

    for index in (1..max_count - 1).rev() {
        let source = history_path(path, index);
        ignore_missing(fs::rename(&source, &destination))?;
        destination = source;
    }

    fs::rename(path, &destination)
}

fn ignore_missing(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

// Unbounded growth is worse than lost history.
fn discard_active(path: &Path) {
    if fs::remove_file(path).is_err() {
        let _ = OpenOptions::new().write(true).truncate(true).open(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_lines(appender: &RotatingAppender, count: usize, policy: Option<RotationPolicy>) {
        for i in 0..count {
            let line = format!("line {:04}\n", i);
            match policy {
                Some(policy) => appender.write_with_rotation(line, policy),
                None => appender.write(line),
            }
        }
    }

    #[test]
    fn test_history_path() {
        assert_eq!(
            history_path(Path::new("/logs/app.log"), 3),
            PathBuf::from("/logs/app3.log")
        );
        assert_eq!(history_path(Path::new("/logs/app"), 1), PathBuf::from("/logs/app1"));
        assert_eq!(
            history_path(Path::new("/logs/app.tar.log"), 2),
            PathBuf::from("/logs/app.tar2.log")
        );
    }

    #[test]
    fn test_open_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("new.log");

        let appender = RotatingAppender::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(appender.path(), path.as_path());
    }

    #[test]
    fn test_open_fails_in_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("app.log");

        let err = RotatingAppender::open(&path).unwrap_err();
        assert!(matches!(err, RotalogError::System(_)));
    }

    #[test]
    fn test_open_appends_to_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        fs::write(&path, "existing\n").unwrap();

        let appender = RotatingAppender::open(&path).unwrap();
        appender.write("appended\n");
        drop(appender);

        assert_eq!(fs::read_to_string(&path).unwrap(), "existing\nappended\n");
    }

    #[test]
    fn test_drop_drains_queued_writes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");

        let appender = RotatingAppender::open(&path).unwrap();
        write_lines(&appender, 5000, None);
        drop(appender);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5000);
        assert_eq!(lines[0], "line 0000");
        assert_eq!(lines[4999], "line 4999");
    }

    #[test]
    fn test_flush_waits_for_pending_writes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");

        let appender = RotatingAppender::open(&path).unwrap();
        write_lines(&appender, 100, None);
        appender.flush();

        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 100);
    }

    #[test]
    fn test_rotation_checked_every_tenth_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let policy = RotationPolicy::new(10, 3);

        let appender = RotatingAppender::open(&path).unwrap();
        write_lines(&appender, 9, Some(policy));
        appender.flush();
        assert!(!history_path(&path, 1).exists());

        write_lines(&appender, 1, Some(policy));
        appender.flush();
        assert!(history_path(&path, 1).exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        assert_eq!(fs::read_to_string(history_path(&path, 1)).unwrap().lines().count(), 10);
    }

    #[test]
    fn test_no_rotation_below_max_size() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let policy = RotationPolicy::new(1_000_000, 3);

        let appender = RotatingAppender::open(&path).unwrap();
        write_lines(&appender, 50, Some(policy));
        drop(appender);

        assert!(!history_path(&path, 1).exists());
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 50);
    }

    #[test]
    fn test_rotate_files_shifts_history() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        fs::write(&path, "active").unwrap();
        fs::write(history_path(&path, 1), "one").unwrap();
        fs::write(history_path(&path, 2), "two").unwrap();

        rotate_files(&path, 3).unwrap();

        assert!(!path.exists());
        assert_eq!(fs::read_to_string(history_path(&path, 1)).unwrap(), "active");
        assert_eq!(fs::read_to_string(history_path(&path, 2)).unwrap(), "one");
        assert!(!history_path(&path, 3).exists());
    }

    #[test]
    fn test_rotate_files_with_partial_history() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        fs::write(&path, "active").unwrap();

        rotate_files(&path, 5).unwrap();

        assert_eq!(fs::read_to_string(history_path(&path, 1)).unwrap(), "active");
        for index in 2..5 {
            assert!(!history_path(&path, index).exists());
        }
    }

    #[test]
    fn test_rotate_files_fails_without_active_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");

        assert!(rotate_files(&path, 3).is_err());
    }

    #[test]
    fn test_single_file_count_keeps_no_history() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let diagnostics = Arc::new(Diagnostics::new());
        let policy = RotationPolicy::new(10, 1);

        let appender = RotatingAppender::open_with(&path, diagnostics.clone()).unwrap();
        write_lines(&appender, 20, Some(policy));
        drop(appender);

        assert!(!history_path(&path, 1).exists());
        assert!(!history_path(&path, 0).exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        assert_eq!(diagnostics.snapshot().rotations, 2);
        assert_eq!(diagnostics.snapshot().rotation_discards, 0);
    }

    #[test]
    fn test_failed_rotation_discards_active_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let diagnostics = Arc::new(Diagnostics::new());
        let policy = RotationPolicy::new(10, 3);

        // A non-empty directory in the oldest slot cannot be removed as a file.
        let blocker = history_path(&path, 2);
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), "x").unwrap();

        let appender = RotatingAppender::open_with(&path, diagnostics.clone()).unwrap();
        write_lines(&appender, 10, Some(policy));
        appender.write("after\n");
        drop(appender);

        assert_eq!(fs::read_to_string(&path).unwrap(), "after\n");
        assert!(!history_path(&path, 1).exists());
        assert_eq!(diagnostics.snapshot().rotation_discards, 1);
        assert_eq!(diagnostics.snapshot().rotations, 0);
    }

    fn detached_writer(path: PathBuf, diagnostics: Arc<Diagnostics>) -> FileWriter {
        FileWriter {
            path,
            file: None,
            writes: 0,
            reopen_failed: false,
            diagnostics,
        }
    }

    #[test]
    fn test_writes_dropped_until_file_can_be_reopened() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("gone");
        let path = dir.join("app.log");
        let diagnostics = Arc::new(Diagnostics::new());
        let policy = RotationPolicy::new(1, 3);

        let mut writer = detached_writer(path.clone(), diagnostics.clone());
        writer.write(b"lost\n");
        assert!(writer.file.is_none());
        assert_eq!(diagnostics.snapshot().dropped_writes, 1);

        // Stat fails while the directory is missing, so no rotation happens.
        for _ in 0..WRITES_BETWEEN_ROTATION_CHECK {
            writer.check_and_rotate(policy);
        }
        assert!(writer.file.is_none());
        assert_eq!(diagnostics.snapshot().rotations, 0);
        assert_eq!(diagnostics.snapshot().rotation_discards, 0);

        fs::create_dir(&dir).unwrap();
        writer.write(b"kept\n");
        writer.flush();

        assert!(writer.file.is_some());
        assert!(!writer.reopen_failed);
        assert_eq!(diagnostics.snapshot().dropped_writes, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "kept\n");
    }

    #[test]
    fn test_plain_writes_recover_after_failed_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let diagnostics = Arc::new(Diagnostics::new());

        // The active path is taken by a directory, so opening it fails.
        fs::create_dir(&path).unwrap();
        let mut writer = detached_writer(path.clone(), diagnostics.clone());
        writer.write(b"one\n");
        writer.write(b"two\n");
        assert!(writer.reopen_failed);
        assert_eq!(diagnostics.snapshot().dropped_writes, 2);

        fs::remove_dir(&path).unwrap();
        writer.write(b"three\n");
        writer.flush();

        assert_eq!(fs::read_to_string(&path).unwrap(), "three\n");
        assert_eq!(diagnostics.snapshot().dropped_writes, 2);
    }
}
