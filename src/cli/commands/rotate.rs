//! Implementation of the `rotolog rotate` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::logging::Logger;

/// Arguments for `rotolog rotate`
#[derive(Args, Debug)]
pub struct RotateArgs {}

/// Result of a forced rotation
#[derive(Debug, Serialize)]
pub struct RotateOutput {
    /// Always true once printed
    pub success: bool,
    /// Rotated base file
    pub file_path: PathBuf,
    /// `None` when the backup was pruned right away (`max_backups: 0`)
    pub backup: Option<PathBuf>,
}

impl CommandOutput for RotateOutput {
    fn to_human(&self) -> String {
        match &self.backup {
            Some(backup) => format!(
                "Rotated {} -> {}",
                self.file_path.display(),
                backup.display()
            ),
            None => format!(
                "Rotated {} (no backups retained)",
                self.file_path.display()
            ),
        }
    }
}

/// Rotate the configured log file now
pub fn execute(_args: &RotateArgs, config: &Config, json_mode: bool) -> Result<()> {
    if !config.logger.file_output_enabled() {
        anyhow::bail!("No log file configured; set logger.file_path");
    }

    let mut logger_config = config.logger.clone();
    logger_config.log_to_console = false;
    let logger = Logger::new(&logger_config).context("failed to initialize logger")?;

    let backup = logger
        .rotate()
        .context("failed to rotate log file")?
        .filter(|path| path.exists());
    logger.close().context("failed to close log file")?;

    output(
        &RotateOutput {
            success: true,
            file_path: config.logger.file_path.clone(),
            backup,
        },
        json_mode,
    );
    Ok(())
}
