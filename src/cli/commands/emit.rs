//! Implementation of the `rotolog emit` command.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use crate::domain::models::{Config, Fields, LogLevel};
use crate::infrastructure::logging::Logger;

/// Arguments for `rotolog emit`
#[derive(Args, Debug)]
pub struct EmitArgs {
    /// Message to log
    pub message: String,

    /// Record level
    #[arg(short, long, default_value = "info")]
    pub level: LogLevel,

    /// Structured field as key=value; values that parse as JSON keep their type
    #[arg(short = 'f', long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, Value)>,
}

/// Log one record and close the logger
pub fn execute(args: EmitArgs, config: &Config) -> Result<()> {
    let logger = Logger::new(&config.logger).context("failed to initialize logger")?;

    let fields: Fields = args.fields.into_iter().collect();
    logger.log(args.level, &args.message, &[&fields]);

    logger.close().context("failed to close log file")?;
    Ok(())
}

/// Parse `key=value`. `n=3` yields a number, `name=ada` a string.
pub fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty field name in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
