//! Logging infrastructure
//!
//! - Text and JSON line formatting
//! - Leveled logger with console and file sinks
//! - Size-based rotation with gzip and retention
//! - Diagnostics side channel on `tracing`

pub mod diagnostics;
pub mod formatter;
pub mod logger;
pub mod rotation;

pub use diagnostics::DiagnosticsGuard;
pub use formatter::{formatter_for, JsonFormatter, TextFormatter};
pub use logger::{merge_fields, Logger, LoggerBuilder, FATAL_EXIT_CODE};
pub use rotation::LogRotator;
