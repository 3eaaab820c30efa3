//! Domain models

pub mod config;
pub mod level;
pub mod rotation;

pub use config::{
    BackupTimestamp, Config, DiagnosticsConfig, DiagnosticsFormat, LogFormat, LoggerConfig,
};
pub use level::{LogLevel, ParseLevelError};
pub use rotation::{BackupFile, RotationPolicy};

/// Structured fields attached to one record
pub type Fields = serde_json::Map<String, serde_json::Value>;
