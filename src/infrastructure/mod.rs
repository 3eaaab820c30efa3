//! Infrastructure layer
//!
//! File-system and process adapters:
//! - Configuration loading (figment)
//! - Logger, formatters and rotation
//! - Process termination

pub mod config;
pub mod logging;
pub mod process;
