//! CLI command implementations.

/// `rotolog backups`
pub mod backups;
/// `rotolog emit`
pub mod emit;
/// `rotolog pipe`
pub mod pipe;
/// `rotolog rotate`
pub mod rotate;
