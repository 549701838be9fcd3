//! Structured logging setup (spec §4.2): every event goes to stdout as
//! plain text and, additionally, to `logs/{run_id}.log` as one JSON object
//! per line via a non-blocking writer.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. The returned guard must be held for the
/// process lifetime — dropping it early would stop the background writer
/// thread and truncate the log file's tail.
pub fn init(log_dir: &Path, run_id: &str) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(log_dir).with_context(|| format!("creating log directory {log_dir:?}"))?;

    let file_appender = tracing_appender::rolling::never(log_dir, format!("{run_id}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
        .init();

    Ok(guard)
}
