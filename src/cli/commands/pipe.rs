//! Implementation of the `rotolog pipe` command.

use anyhow::{Context, Result};
use clap::Args;
use std::io::{self, BufRead};

use crate::domain::models::{Config, LogLevel};
use crate::infrastructure::logging::Logger;

/// Arguments for `rotolog pipe`
#[derive(Args, Debug)]
pub struct PipeArgs {
    /// Level for every record
    #[arg(short, long, default_value = "info")]
    pub level: LogLevel,

    /// Keep blank lines instead of skipping them
    #[arg(long)]
    pub keep_blank: bool,
}

/// Forward stdin until EOF
pub fn execute(args: &PipeArgs, config: &Config) -> Result<()> {
    let logger = Logger::new(&config.logger).context("failed to initialize logger")?;
    let stdin = io::stdin();
    let count = forward_lines(&logger, stdin.lock(), args)?;

    tracing::debug!(lines = count, "stdin drained");
    logger.close().context("failed to close log file")?;
    Ok(())
}

/// Log each line of `input`; returns the number of lines forwarded
pub fn forward_lines(logger: &Logger, input: impl BufRead, args: &PipeArgs) -> Result<usize> {
    let mut count = 0;
    for line in input.lines() {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() && !args.keep_blank {
            continue;
        }
        logger.log(args.level, &line, &[]);
        count += 1;
    }
    Ok(count)
}
