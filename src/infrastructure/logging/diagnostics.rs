//! Diagnostics subscriber for the logger's own failures

use anyhow::{Context, Result};
use std::fs;
use std::io;
use tracing::level_filters::LevelFilter;
use tracing::{Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::{LookupSpan, Registry};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use super::rotation::open_append;
use crate::domain::models::{DiagnosticsConfig, DiagnosticsFormat};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Keeps the non-blocking diagnostics file writer alive
pub struct DiagnosticsGuard {
    _guard: Option<WorkerGuard>,
}

/// Install the process-wide diagnostics subscriber
///
/// Diagnostics are the logger's own failures (rotation, compression, write
/// errors). They go to stderr, and as JSON lines to `config.file` when set,
/// never into the primary log.
///
/// # Arguments
/// * `config` - Diagnostics configuration
///
/// # Returns
/// * `Result<DiagnosticsGuard>` - Guard flushing the file writer on drop
///
/// # Errors
/// Returns an error if the level is invalid, the file cannot be opened or a
/// global subscriber is already installed
pub fn init(config: &DiagnosticsConfig) -> Result<DiagnosticsGuard> {
    let default_level = parse_log_level(&config.level)?;

    let mut layers: Vec<BoxedLayer<Registry>> = vec![stderr_layer(config.format, default_level)];

    let guard = if let Some(ref path) = config.file {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create diagnostics directory {}", dir.display()))?;
        }
        let file = open_append(path)
            .with_context(|| format!("failed to open diagnostics file {}", path.display()))?;
        let (non_blocking_file, guard) = tracing_appender::non_blocking(file);

        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(env_filter(default_level))
                .boxed(),
        );
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .context("failed to install diagnostics subscriber")?;

    tracing::debug!(
        level = %config.level,
        format = ?config.format,
        file_output = config.file.is_some(),
        "diagnostics initialized"
    );

    Ok(DiagnosticsGuard { _guard: guard })
}

fn stderr_layer<S>(format: DiagnosticsFormat, level: Level) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        DiagnosticsFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_filter(env_filter(level))
            .boxed(),
        DiagnosticsFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .with_filter(env_filter(level))
            .boxed(),
    }
}

/// `RUST_LOG` wins over the configured default
fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy()
}

/// Parse log level string to Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {level}"),
    }
}
