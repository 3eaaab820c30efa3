//! Rotolog - leveled structured logging with size-based rotation
//!
//! A process-embedded logger writing text or JSON lines to the console and to
//! one local file. Before every write the file's size is checked; once it
//! reaches the configured threshold the file is renamed to a timestamped
//! backup, optionally gzipped, old backups are pruned and a fresh file is
//! opened.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): levels, configuration, rotation policy, ports
//! - **Infrastructure Layer** (`infrastructure`): logger, formatters, rotator,
//!   config loading, diagnostics
//! - **CLI Layer** (`cli`): the `rotolog` command
//!
//! # Example
//!
//! ```no_run
//! use rotolog::{fields, Logger, LogLevel};
//!
//! fn main() -> Result<(), rotolog::LogError> {
//!     let logger = Logger::builder()
//!         .level(LogLevel::Info)
//!         .file_path("logs/app.log")
//!         .max_size_mb(10)
//!         .max_backups(5)
//!         .compress(true)
//!         .build()?;
//!
//!     logger.info("started", &[&fields! { "version" => "1.2.0", "workers" => 4 }]);
//!     logger.close()
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;

// Re-exported for the `fields!` macro
#[doc(hidden)]
pub use serde_json;

pub use domain::error::{ConfigError, LogError, RotationError};
pub use domain::models::{
    BackupFile, BackupTimestamp, Config, DiagnosticsConfig, DiagnosticsFormat, Fields, LogFormat,
    LogLevel, LoggerConfig, RotationPolicy,
};
pub use domain::ports::{Formatter, Terminator};
pub use infrastructure::config::ConfigLoader;
pub use infrastructure::logging::{
    JsonFormatter, LogRotator, Logger, LoggerBuilder, TextFormatter, FATAL_EXIT_CODE,
};
pub use infrastructure::process::ProcessTerminator;

/// Build a [`Fields`] map.
///
/// Values go through `serde_json::json!`, so each value is a single token
/// tree: a literal, an identifier, `null`, an array/object literal, or a
/// parenthesized expression.
///
/// ```
/// use rotolog::fields;
///
/// let attempt = 3;
/// let fields = fields! { "user" => "ada", "attempt" => attempt, "next" => (attempt + 1) };
/// assert_eq!(fields["next"], 4);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:tt),+ $(,)?) => {{
        let mut map = $crate::Fields::new();
        $(
            map.insert(::std::string::String::from($key), $crate::serde_json::json!($value));
        )+
        map
    }};
}
