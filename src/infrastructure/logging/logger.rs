//! The leveled logger and its builder

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use super::formatter::formatter_for;
use super::rotation::{open_append, LogRotator};
use crate::domain::error::LogError;
use crate::domain::models::{
    BackupFile, BackupTimestamp, Fields, LogFormat, LogLevel, LoggerConfig, RotationPolicy,
};
use crate::domain::ports::{Formatter, Terminator};
use crate::infrastructure::process::ProcessTerminator;

/// Exit status used after a FATAL record
pub const FATAL_EXIT_CODE: i32 = 1;

/// Leveled logger writing to the console and a size-rotated file
///
/// Every admitted call runs format, rotate-if-needed and both writes inside a
/// single lock, so lines never interleave and no writer sees a half-rotated
/// file. Write and rotation failures go to the `tracing` side channel; they
/// never reach the caller.
pub struct Logger {
    level: LogLevel,
    formatter: Box<dyn Formatter>,
    rotator: Option<LogRotator>,
    terminator: Arc<dyn Terminator>,
    sinks: Mutex<Sinks>,
}

/// Mutable sink state, only touched under the logger's lock
struct Sinks {
    console: Option<Box<dyn Write + Send>>,
    file: Option<File>,
    closed: bool,
}

impl Logger {
    /// Build a logger from configuration
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the log file
    /// cannot be created
    pub fn new(config: &LoggerConfig) -> Result<Self, LogError> {
        LoggerBuilder::from_config(config.clone()).build()
    }

    /// Start a [`LoggerBuilder`] from default configuration
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Configured minimum level
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    /// Whether a record at `level` would be written
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.level.admits(level)
    }

    /// Base log file, if file output is enabled
    pub fn file_path(&self) -> Option<&Path> {
        self.rotator.as_ref().map(LogRotator::path)
    }

    /// Write one record
    ///
    /// `fields` are merged left to right; a later map wins on duplicate keys.
    /// FATAL records terminate the process once written.
    pub fn log(&self, level: LogLevel, message: &str, fields: &[&Fields]) {
        if !self.enabled(level) {
            return;
        }

        let fields = merge_fields(fields);
        {
            let mut sinks = self.lock();
            let line = self.formatter.format(level, message, &fields);
            self.write_locked(&mut sinks, line.as_bytes());
        }

        if level == LogLevel::Fatal {
            self.terminator.terminate(FATAL_EXIT_CODE);
        }
    }

    /// Log at TRACE
    pub fn trace(&self, message: &str, fields: &[&Fields]) {
        self.log(LogLevel::Trace, message, fields);
    }

    /// Log at DEBUG
    pub fn debug(&self, message: &str, fields: &[&Fields]) {
        self.log(LogLevel::Debug, message, fields);
    }

    /// Log at INFO
    pub fn info(&self, message: &str, fields: &[&Fields]) {
        self.log(LogLevel::Info, message, fields);
    }

    /// Log at WARN
    pub fn warn(&self, message: &str, fields: &[&Fields]) {
        self.log(LogLevel::Warn, message, fields);
    }

    /// Log at ERROR
    pub fn error(&self, message: &str, fields: &[&Fields]) {
        self.log(LogLevel::Error, message, fields);
    }

    /// Log at FATAL, then terminate with [`FATAL_EXIT_CODE`]
    pub fn fatal(&self, message: &str, fields: &[&Fields]) {
        self.log(LogLevel::Fatal, message, fields);
    }

    /// Flush and release the log file
    ///
    /// Later calls skip the file sink. Closing again is a no-op.
    pub fn close(&self) -> Result<(), LogError> {
        let mut sinks = self.lock();
        if sinks.closed {
            return Ok(());
        }
        sinks.closed = true;

        if let Some(console) = sinks.console.as_mut() {
            if let Err(error) = console.flush() {
                warn!(error = %error, "failed to flush console sink");
            }
        }

        match sinks.file.take() {
            Some(mut file) => {
                file.flush().and_then(|()| file.sync_all()).map_err(LogError::Close)?;
                debug!("log file closed");
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Rotate the log file now, regardless of its size
    ///
    /// # Returns
    /// The backup path, or `None` when file output is disabled or closed
    pub fn rotate(&self) -> Result<Option<PathBuf>, LogError> {
        let Some(rotator) = &self.rotator else {
            return Ok(None);
        };
        let mut sinks = self.lock();
        if sinks.closed {
            return Ok(None);
        }
        Ok(Some(rotator.rotate(&mut sinks.file)?))
    }

    /// Rotated backups, newest first
    pub fn backups(&self) -> Result<Vec<BackupFile>, LogError> {
        match &self.rotator {
            Some(rotator) => Ok(rotator.backups()?),
            None => Ok(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Sinks> {
        // A panic in another writer leaves the sinks usable
        self.sinks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_locked(&self, sinks: &mut Sinks, line: &[u8]) {
        let file_ready = self.prepare_file(sinks);

        if let Some(console) = sinks.console.as_mut() {
            if let Err(error) = console.write_all(line).and_then(|()| console.flush()) {
                warn!(error = %error, "failed to write log line to console");
            }
        }

        if !file_ready {
            return;
        }
        if let (Some(file), Some(rotator)) = (sinks.file.as_mut(), &self.rotator) {
            if let Err(error) = file.write_all(line) {
                warn!(path = %rotator.path().display(), error = %error, "failed to write log line to file");
            }
        }
    }

    /// Reopen a lost handle and rotate if due. Returns whether the file sink
    /// should be written.
    fn prepare_file(&self, sinks: &mut Sinks) -> bool {
        let Some(rotator) = &self.rotator else {
            return false;
        };
        if sinks.closed {
            return false;
        }

        if sinks.file.is_none() {
            match open_append(rotator.path()) {
                Ok(file) => sinks.file = Some(file),
                Err(error) => {
                    warn!(path = %rotator.path().display(), error = %error, "failed to reopen log file");
                    return false;
                }
            }
        }

        if let Err(error) = rotator.rotate_if_needed(&mut sinks.file) {
            warn!(path = %rotator.path().display(), error = %error, "log rotation failed");
        }
        sinks.file.is_some()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("rotator", &self.rotator)
            .finish_non_exhaustive()
    }
}

/// Merge field maps left to right
pub fn merge_fields(fields: &[&Fields]) -> Fields {
    match fields {
        [] => Fields::new(),
        [only] => (*only).clone(),
        many => {
            let mut merged = Fields::new();
            for map in many {
                for (key, value) in *map {
                    merged.insert(key.clone(), value.clone());
                }
            }
            merged
        }
    }
}

/// Builder for [`Logger`]
///
/// Starts from [`LoggerConfig::default`]. Setting a console writer enables
/// console output and replaces stdout.
pub struct LoggerBuilder {
    config: LoggerConfig,
    max_size_bytes: Option<u64>,
    console: Option<Box<dyn Write + Send>>,
    terminator: Option<Arc<dyn Terminator>>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerBuilder {
    /// Builder over [`LoggerConfig::default`]
    pub fn new() -> Self {
        Self::from_config(LoggerConfig::default())
    }

    /// Builder over an existing configuration
    pub fn from_config(config: LoggerConfig) -> Self {
        Self {
            config,
            max_size_bytes: None,
            console: None,
            terminator: None,
        }
    }

    /// Minimum level admitted
    #[must_use]
    pub const fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Base log file; empty disables file output
    #[must_use]
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.file_path = path.into();
        self
    }

    /// Enable or disable the console sink
    #[must_use]
    pub const fn log_to_console(mut self, enabled: bool) -> Self {
        self.config.log_to_console = enabled;
        self
    }

    /// Line format
    #[must_use]
    pub const fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Rotation threshold in MiB; clears a byte override
    #[must_use]
    pub const fn max_size_mb(mut self, max_size_mb: u64) -> Self {
        self.config.max_size_mb = max_size_mb;
        self.max_size_bytes = None;
        self
    }

    /// Byte-precise threshold, overriding `max_size_mb`
    #[must_use]
    pub const fn max_size_bytes(mut self, max_size: u64) -> Self {
        self.max_size_bytes = Some(max_size);
        self
    }

    /// Backups kept after each rotation
    #[must_use]
    pub const fn max_backups(mut self, max_backups: usize) -> Self {
        self.config.max_backups = max_backups;
        self
    }

    /// Gzip rotated backups
    #[must_use]
    pub const fn compress(mut self, compress: bool) -> Self {
        self.config.compress = compress;
        self
    }

    /// Backup suffix precision
    #[must_use]
    pub const fn backup_timestamp(mut self, timestamp: BackupTimestamp) -> Self {
        self.config.backup_timestamp = timestamp;
        self
    }

    /// Console sink replacing stdout
    #[must_use]
    pub fn console_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.config.log_to_console = true;
        self.console = Some(Box::new(writer));
        self
    }

    /// Handler invoked after FATAL records
    #[must_use]
    pub fn terminator(mut self, terminator: Arc<dyn Terminator>) -> Self {
        self.terminator = Some(terminator);
        self
    }

    /// Validate, create the log directory and open the base file
    pub fn build(self) -> Result<Logger, LogError> {
        let config = self.config;
        config.validate()?;

        let (rotator, file) = if config.file_output_enabled() {
            let mut policy = RotationPolicy::from_config(&config);
            if let Some(max_size) = self.max_size_bytes {
                policy.max_size = max_size;
            }
            let file = open_log_file(&config.file_path)?;
            (Some(LogRotator::new(&config.file_path, policy)), Some(file))
        } else {
            (None, None)
        };

        let console: Option<Box<dyn Write + Send>> = if config.log_to_console {
            Some(self.console.unwrap_or_else(|| Box::new(io::stdout())))
        } else {
            None
        };

        debug!(
            level = %config.level,
            format = ?config.format,
            file_output = config.file_output_enabled(),
            console_output = console.is_some(),
            "logger initialized"
        );

        Ok(Logger {
            level: config.level,
            formatter: formatter_for(config.format),
            rotator,
            terminator: self
                .terminator
                .unwrap_or_else(|| Arc::new(ProcessTerminator)),
            sinks: Mutex::new(Sinks {
                console,
                file,
                closed: false,
            }),
        })
    }
}

fn open_log_file(path: &Path) -> Result<File, LogError> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| LogError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    open_append(path).map_err(|source| LogError::Open {
        path: path.to_path_buf(),
        source,
    })
}
