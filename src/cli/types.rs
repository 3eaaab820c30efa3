//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::backups::BackupsArgs;
use super::commands::emit::EmitArgs;
use super::commands::pipe::PipeArgs;
use super::commands::rotate::RotateArgs;

/// Top-level command line
#[derive(Parser)]
#[command(name = "rotolog")]
#[command(about = "Rotolog - leveled logging with size-based rotation", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to rotolog.yaml + rotolog.local.yaml + ROTOLOG_* env)
    #[arg(short, long, global = true, env = "ROTOLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Write one record
    Emit(EmitArgs),

    /// Write every stdin line as a record
    Pipe(PipeArgs),

    /// Rotate the log file now
    Rotate(RotateArgs),

    /// List rotated backups
    Backups(BackupsArgs),
}
