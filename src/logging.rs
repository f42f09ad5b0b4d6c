//! Subscriber setup: level filter, rolling log file, and a coloured stdout
//! copy in text mode.
//!
//! Request spans from the gateway's `TraceLayer` are emitted at INFO, so they
//! show up under the shipped `info` level and disappear under `warn`.

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;

/// Filter directives for a configured level. Statement logs from sqlx are
/// capped at warn.
fn filter_directives(level: &str) -> String {
    format!("{},sqlx=warn", level)
}

/// `hourly`, `daily` or `minutely`; anything else keeps a single file.
fn rotation(name: &str) -> Rotation {
    match name {
        "minutely" => Rotation::MINUTELY,
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        _ => Rotation::NEVER,
    }
}

/// Install the global subscriber. `RUST_LOG`, when set, replaces the
/// configured level.
///
/// The returned guard flushes the file writer on drop; hold it until exit.
pub fn init_logging(config: &AppConfig) -> anyhow::Result<WorkerGuard> {
    let appender = RollingFileAppender::builder()
        .rotation(rotation(&config.rotation))
        .filename_prefix(config.log_file.as_str())
        .build(&config.log_dir)
        .with_context(|| format!("Failed to open log file in {}", config.log_dir))?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.log_level)));

    // JSON goes to the file only; text mode also mirrors to the terminal.
    let json_file = config.use_json.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(file_writer.clone())
    });
    let text_file = (!config.use_json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(file_writer.clone())
    });
    let terminal = (!config.use_json).then(|| fmt::layer().with_target(false));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_file)
        .with(text_file)
        .with(terminal)
        .init();

    tracing::debug!(
        "Logging to {}/{} (rotation {}, json {})",
        config.log_dir,
        config.log_file,
        config.rotation,
        config.use_json
    );
    Ok(guard)
}
