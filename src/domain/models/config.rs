//! Logger and diagnostics configuration

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use super::level::LogLevel;
use crate::domain::error::ConfigError;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Primary log output
    #[serde(default)]
    pub logger: LoggerConfig,

    /// Side channel for the logger's own failures
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggerConfig {
    /// Minimum level admitted
    #[serde(default)]
    pub level: LogLevel,

    /// Base log file. Empty disables file output.
    #[serde(default)]
    pub file_path: PathBuf,

    /// Mirror records to stdout
    #[serde(default = "default_true")]
    pub log_to_console: bool,

    /// Line format
    #[serde(default)]
    pub format: LogFormat,

    /// Rotation threshold in MiB; 0 disables size rotation
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,

    /// Number of rotated backups to keep
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,

    /// Gzip rotated backups
    #[serde(default)]
    pub compress: bool,

    /// Precision of the timestamp suffix on backup files
    #[serde(default)]
    pub backup_timestamp: BackupTimestamp,
}

/// Output line format
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `[ts] LEVEL message k=v`
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Timestamp suffix appended to rotated backups.
///
/// Two rotations that format to the same suffix share a backup name; the
/// later rename replaces the earlier backup.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackupTimestamp {
    /// `YYYYMMDD_HHMMSS`
    #[default]
    Seconds,
    /// `YYYYMMDD_HHMMSS_mmm`
    Millis,
}

impl BackupTimestamp {
    /// chrono format string for the suffix
    pub const fn pattern(self) -> &'static str {
        match self {
            Self::Seconds => "%Y%m%d_%H%M%S",
            Self::Millis => "%Y%m%d_%H%M%S_%3f",
        }
    }
}

/// Diagnostics (tracing) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DiagnosticsConfig {
    /// Default filter level (trace, debug, info, warn, error); `RUST_LOG` overrides
    #[serde(default = "default_diagnostics_level")]
    pub level: String,

    /// stderr format
    #[serde(default)]
    pub format: DiagnosticsFormat,

    /// Optional file receiving diagnostics as JSON lines
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// stderr rendering of diagnostics
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticsFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// JSON lines
    Json,
}

impl Config {
    /// Validate both sections and keep diagnostics away from the primary log
    ///
    /// A diagnostics file at the log path, or named like one of its backups,
    /// would be written outside the logger's lock or pruned by retention.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logger.validate()?;
        self.diagnostics.validate()?;

        if let Some(diagnostics) = &self.diagnostics.file {
            if self.logger.file_output_enabled()
                && shares_log_namespace(&self.logger.file_path, diagnostics)
            {
                return Err(ConfigError::DiagnosticsCollidesWithLog {
                    diagnostics: diagnostics.clone(),
                    log: self.logger.file_path.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            file_path: PathBuf::new(),
            log_to_console: true,
            format: LogFormat::default(),
            max_size_mb: default_max_size_mb(),
            max_backups: default_max_backups(),
            compress: false,
            backup_timestamp: BackupTimestamp::default(),
        }
    }
}

impl LoggerConfig {
    /// File output is enabled by a non-empty path
    pub fn file_output_enabled(&self) -> bool {
        !self.file_path.as_os_str().is_empty()
    }

    /// Rotation threshold in bytes
    pub const fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(BYTES_PER_MB)
    }

    /// Reject a file path that does not name a file
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_output_enabled() && !names_file(&self.file_path) {
            return Err(ConfigError::InvalidFilePath(self.file_path.clone()));
        }
        Ok(())
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            level: default_diagnostics_level(),
            format: DiagnosticsFormat::default(),
            file: None,
        }
    }
}

impl DiagnosticsConfig {
    /// Reject unknown levels and paths that do not name a file
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidDiagnosticsLevel(self.level.clone()));
        }
        if let Some(file) = &self.file {
            if !names_file(file) {
                return Err(ConfigError::InvalidFilePath(file.clone()));
            }
        }
        Ok(())
    }
}

/// `Path::file_name` is `None` for `..` and for paths ending in a separator
fn names_file(path: &Path) -> bool {
    let trailing_separator = path
        .to_str()
        .is_some_and(|s| s.ends_with(std::path::MAIN_SEPARATOR) || s.ends_with('/'));
    path.file_name().is_some() && !trailing_separator
}

/// `candidate` is `log` itself or sits next to it under the `<file name>.` prefix
fn shares_log_namespace(log: &Path, candidate: &Path) -> bool {
    let (Some(log_name), Some(candidate_name)) = (log.file_name(), candidate.file_name()) else {
        return false;
    };
    if dir_of(log) != dir_of(candidate) {
        return false;
    }

    let log_name = log_name.to_string_lossy();
    let candidate_name = candidate_name.to_string_lossy();
    candidate_name == log_name || candidate_name.starts_with(&format!("{log_name}."))
}

/// Parent directory with `.` segments dropped; bare names live in `.`
fn dir_of(path: &Path) -> PathBuf {
    let dir: PathBuf = path
        .parent()
        .map(|dir| {
            dir.components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect::<PathBuf>()
        })
        .unwrap_or_default();
    if dir.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        dir
    }
}

const fn default_true() -> bool {
    true
}

const fn default_max_size_mb() -> u64 {
    10
}

const fn default_max_backups() -> usize {
    5
}

fn default_diagnostics_level() -> String {
    "warn".to_string()
}
