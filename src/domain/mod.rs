//! Domain layer
//!
//! Levels, configuration, rotation policy and the ports the logger is
//! assembled from. Nothing here touches the file system.

pub mod error;
pub mod models;
pub mod ports;

pub use error::{ConfigError, LogError, RotationError};
