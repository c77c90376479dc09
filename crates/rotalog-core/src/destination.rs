//! Destinations attached to loggers.
//!
//! A destination decides whether a record is emitted, renders it, and hands
//! the line to its sink. File destinations never write a file themselves: all
//! I/O goes through the [`RotatingAppender`] shared by every destination using
//! the same path.

use crate::appender::RotatingAppender;
use crate::directory::LogDirectory;
use crate::registry::AppenderRegistry;
use colored::Colorize;
use rotalog_types::{
    destination_id, AppenderConfig, AppenderKind, Destination, LoggerConfig, Record, Result,
    RotationPolicy, Severity,
};
use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Which decorations precede the message of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFormat {
    /// Show the record's timestamp
    pub show_date: bool,
    /// Show the record's severity
    pub show_level: bool,
    /// Show the identifier of the logger that produced the record
    pub show_identifier: bool,
    /// Show the source file name of the call site
    pub show_file_name: bool,
    /// Show the source line of the call site
    pub show_line_number: bool,
}

impl Default for LineFormat {
    fn default() -> Self {
        Self {
            show_date: true,
            show_level: true,
            show_identifier: true,
            show_file_name: true,
            show_line_number: true,
        }
    }
}

impl LineFormat {
    /// Render `record` as a single line, without the trailing newline.
    ///
    /// `2024-05-01 12:00:00.000 [Info] [App.Module] [main.rs:42] > message`
    pub fn render(&self, record: &Record<'_>) -> String {
        self.render_with_level(record, &record.level.to_string())
    }

    fn render_with_level(&self, record: &Record<'_>, level: &str) -> String {
        let mut line = String::new();

        if self.show_date {
            let _ = write!(line, "{} ", record.timestamp.format(DATE_FORMAT));
        }
        if self.show_level {
            let _ = write!(line, "[{}] ", level);
        }
        if self.show_identifier {
            let _ = write!(line, "[{}] ", record.logger);
        }

        let file = record.file_name().filter(|_| self.show_file_name);
        let number = record.line.filter(|_| self.show_line_number);
        match (file, number) {
            (Some(file), Some(number)) => {
                let _ = write!(line, "[{}:{}] ", file, number);
            }
            (Some(file), None) => {
                let _ = write!(line, "[{}] ", file);
            }
            (None, Some(number)) => {
                let _ = write!(line, "[{}] ", number);
            }
            (None, None) => {}
        }

        line.push_str("> ");
        line.push_str(record.message);
        line
    }
}

/// Destination writing to the process's standard error.
#[derive(Debug)]
pub struct ConsoleDestination {
    identifier: String,
    level: Severity,
    format: LineFormat,
    color: bool,
}

impl ConsoleDestination {
    /// Create a console destination emitting records at `level` and above.
    pub fn new(identifier: impl Into<String>, level: Severity) -> Self {
        Self {
            identifier: identifier.into(),
            level,
            format: LineFormat::default(),
            color: io::stderr().is_terminal(),
        }
    }

    /// Set the line format.
    pub fn with_format(mut self, format: LineFormat) -> Self {
        self.format = format;
        self
    }

    fn colored_level(&self, level: Severity) -> String {
        let text = level.to_string();
        if !self.color {
            return text;
        }

        match level {
            Severity::Fatal => text.red().bold().to_string(),
            Severity::Error => text.red().to_string(),
            Severity::Warning => text.yellow().to_string(),
            Severity::Info => text.green().to_string(),
            Severity::Debug => text.blue().to_string(),
            Severity::Detail | Severity::None => text.dimmed().to_string(),
        }
    }
}

impl Destination for ConsoleDestination {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn output_level(&self) -> Severity {
        self.level
    }

    fn output(&self, record: &Record<'_>) {
        if !self.is_enabled(record.level) {
            return;
        }

        let line = self
            .format
            .render_with_level(record, &self.colored_level(record.level));
        let _ = writeln!(io::stderr().lock(), "{}", line);
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Destination appending to a file through a shared appender.
///
/// With a rotation policy the file is rolled over by size; without one it
/// grows without bound.
#[derive(Debug)]
pub struct FileDestination {
    identifier: String,
    level: Severity,
    format: LineFormat,
    appender: Arc<RotatingAppender>,
    rotation: Option<RotationPolicy>,
}

impl FileDestination {
    /// Create a destination writing through `appender`.
    pub fn new(identifier: impl Into<String>, level: Severity, appender: Arc<RotatingAppender>) -> Self {
        Self {
            identifier: identifier.into(),
            level,
            format: LineFormat::default(),
            appender,
            rotation: None,
        }
    }

    /// Rotate the file according to `policy`.
    pub fn with_rotation(mut self, policy: RotationPolicy) -> Self {
        self.rotation = Some(policy);
        self
    }

    /// Set the line format.
    pub fn with_format(mut self, format: LineFormat) -> Self {
        self.format = format;
        self
    }

    /// The appender this destination writes through.
    pub fn appender(&self) -> &Arc<RotatingAppender> {
        &self.appender
    }

    /// The rotation policy, if the file is rolled over.
    pub fn rotation(&self) -> Option<RotationPolicy> {
        self.rotation
    }
}

impl Destination for FileDestination {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn output_level(&self) -> Severity {
        self.level
    }

    fn output(&self, record: &Record<'_>) {
        if !self.is_enabled(record.level) {
            return;
        }

        let mut line = self.format.render(record);
        line.push('\n');

        match self.rotation {
            Some(policy) => self.appender.write_with_rotation(line, policy),
            None => self.appender.write(line),
        }
    }

    fn flush(&self) {
        self.appender.flush();
    }
}

/// Build the destination `appender` provides for `logger`.
///
/// File-backed kinds create the log directory on first use and obtain their
/// appender from `registry`, keyed by `directory/file`.
///
/// # Errors
///
/// Returns a system error if the directory or the file cannot be created.
pub fn build_destination(
    appender: &AppenderConfig,
    logger: &LoggerConfig,
    directory: &LogDirectory,
    registry: &AppenderRegistry,
) -> Result<Arc<dyn Destination>> {
    let identifier = destination_id(&logger.name, &appender.name);

    let destination: Arc<dyn Destination> = match &appender.kind {
        AppenderKind::Console => Arc::new(ConsoleDestination::new(identifier, logger.severity)),
        AppenderKind::File { file } => {
            directory.create()?;
            let shared = registry.appender_for(directory.file(file))?;
            Arc::new(FileDestination::new(identifier, logger.severity, shared))
        }
        AppenderKind::RollFile { file, max_size, max_count } => {
            directory.create()?;
            let shared = registry.appender_for(directory.file(file))?;
            Arc::new(
                FileDestination::new(identifier, logger.severity, shared)
                    .with_rotation(RotationPolicy::new(*max_size, *max_count)),
            )
        }
    };

    Ok(destination)
}
