//! Rotolog CLI entry point.

use anyhow::Result;
use clap::Parser;

use rotolog::cli::commands::{backups, emit, pipe, rotate};
use rotolog::cli::{Cli, Commands};
use rotolog::infrastructure::logging::diagnostics;
use rotolog::ConfigLoader;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli.command, cli.config.as_deref(), cli.json) {
        rotolog::cli::handle_error(&err, cli.json);
    }
}

fn run(command: Commands, config_path: Option<&std::path::Path>, json: bool) -> Result<()> {
    let config = match config_path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _diagnostics = diagnostics::init(&config.diagnostics)?;

    match command {
        Commands::Emit(args) => emit::execute(args, &config),
        Commands::Pipe(args) => pipe::execute(&args, &config),
        Commands::Rotate(args) => rotate::execute(&args, &config, json),
        Commands::Backups(args) => backups::execute(&args, &config, json),
    }
}
