//! Ports the logger is assembled from

pub mod formatter;
pub mod terminator;

pub use formatter::Formatter;
pub use terminator::Terminator;
