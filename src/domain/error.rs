//! Error types

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Diagnostics level is not a tracing level
    #[error("Invalid diagnostics level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidDiagnosticsLevel(String),

    /// Path does not name a file
    #[error("Invalid log file path: {0}. Path must name a file")]
    InvalidFilePath(PathBuf),

    /// Diagnostics file is the log file or named like one of its backups
    #[error("Diagnostics file {diagnostics} collides with log file {log} or its backups")]
    DiagnosticsCollidesWithLog {
        /// Configured diagnostics file
        diagnostics: PathBuf,
        /// Configured log file
        log: PathBuf,
    },
}

/// Errors raised while rotating the active log file.
///
/// Inside the write path these are reported on the diagnostic channel and
/// swallowed; only the explicit maintenance calls return them.
#[derive(Error, Debug)]
pub enum RotationError {
    /// Active handle could not be stat'ed
    #[error("failed to stat log file: {0}")]
    Stat(#[source] io::Error),

    /// Base file could not be renamed to its backup name
    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        /// Base log file
        from: PathBuf,
        /// Intended backup path
        to: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Backup could not be gzipped; the uncompressed backup is kept
    #[error("failed to compress backup {path}: {source}")]
    Compress {
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Archive written but the uncompressed backup could not be removed
    #[error("compressed backup written but failed to remove {path}: {source}")]
    RemoveSource {
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Fresh base file could not be opened
    #[error("failed to reopen log file {path}: {source}")]
    Reopen {
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Backup directory could not be read
    #[error("failed to list log backups in {dir}: {source}")]
    ListBackups {
        /// Directory that was listed
        dir: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Errors surfaced synchronously by the logger.
///
/// Construction failures and the explicit `close`/`rotate` calls are the only
/// places these reach the caller.
#[derive(Error, Debug)]
pub enum LogError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Log directory could not be created
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        /// Directory involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Log file could not be opened
    #[error("failed to open log file {path}: {source}")]
    Open {
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Flush or sync on close failed
    #[error("failed to close log file: {0}")]
    Close(#[source] io::Error),

    /// Explicit rotation failed
    #[error(transparent)]
    Rotation(#[from] RotationError),
}
