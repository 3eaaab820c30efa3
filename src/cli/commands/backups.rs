//! Implementation of the `rotolog backups` command.

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{BackupFile, Config, RotationPolicy};
use crate::infrastructure::logging::LogRotator;

/// Arguments for `rotolog backups`
#[derive(Args, Debug)]
pub struct BackupsArgs {}

/// Listing printed by `rotolog backups`
#[derive(Debug, Serialize)]
pub struct BackupsOutput {
    /// Configured retention count
    pub max_backups: usize,
    /// Backups on disk, newest first
    pub backups: Vec<BackupFile>,
}

impl CommandOutput for BackupsOutput {
    fn to_human(&self) -> String {
        if self.backups.is_empty() {
            return "No backups found.".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(
                ["PATH", "SIZE", "MODIFIED", "GZIP"]
                    .iter()
                    .map(|h| Cell::new(h).set_alignment(CellAlignment::Left)),
            );

        for backup in &self.backups {
            table.add_row(vec![
                Cell::new(backup.path.display()),
                Cell::new(format_size(backup.size)).set_alignment(CellAlignment::Right),
                Cell::new(backup.modified.format("%Y-%m-%d %H:%M:%S")),
                Cell::new(if backup.is_compressed() { "yes" } else { "no" }),
            ]);
        }

        format!(
            "{} of {} backups:\n{table}",
            self.backups.len(),
            self.max_backups
        )
    }
}

/// List the configured file's backups
pub fn execute(_args: &BackupsArgs, config: &Config, json_mode: bool) -> Result<()> {
    if !config.logger.file_output_enabled() {
        anyhow::bail!("No log file configured; set logger.file_path");
    }

    let rotator = LogRotator::new(
        &config.logger.file_path,
        RotationPolicy::from_config(&config.logger),
    );
    let backups = rotator.backups().context("failed to list backups")?;

    output(
        &BackupsOutput {
            max_backups: config.logger.max_backups,
            backups,
        },
        json_mode,
    );
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
