//! Rotation policy and backup descriptors

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;

use super::config::{BackupTimestamp, LoggerConfig};

/// Immutable rotation settings for one logger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size in bytes at which the active file is rotated; 0 never rotates
    pub max_size: u64,
    /// Backups kept after each rotation
    pub max_backups: usize,
    /// Gzip each backup
    pub compress: bool,
    /// Backup suffix precision
    pub timestamp: BackupTimestamp,
}

impl RotationPolicy {
    /// Policy with second-granularity backup names
    pub const fn new(max_size: u64, max_backups: usize, compress: bool) -> Self {
        Self {
            max_size,
            max_backups,
            compress,
            timestamp: BackupTimestamp::Seconds,
        }
    }

    /// Override the backup suffix precision
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: BackupTimestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Policy described by a logger configuration
    pub const fn from_config(config: &LoggerConfig) -> Self {
        Self {
            max_size: config.max_size_bytes(),
            max_backups: config.max_backups,
            compress: config.compress,
            timestamp: config.backup_timestamp,
        }
    }

    /// Size rotation is enabled
    #[inline]
    pub const fn rotates(&self) -> bool {
        self.max_size > 0
    }

    /// A file of `size` bytes is due for rotation
    #[inline]
    pub const fn should_rotate(&self, size: u64) -> bool {
        self.rotates() && size >= self.max_size
    }
}

/// A rotated log file on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupFile {
    /// Location on disk
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: DateTime<Local>,
}

impl BackupFile {
    /// Backup is a `.gz` archive
    pub fn is_compressed(&self) -> bool {
        self.path.extension().is_some_and(|ext| ext == "gz")
    }
}
