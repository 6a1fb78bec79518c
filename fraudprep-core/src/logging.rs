//! Log sink setup: human-readable stderr plus a JSON file at the configured
//! path, creating parent directories as needed.

use crate::error::PipelineError;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Initialize the global tracing subscriber.
///
/// The returned guard must stay alive for the duration of the run; dropping
/// it flushes and stops the file writer.
pub fn init_logging(log_path: &Path, stderr_filter: &str) -> Result<WorkerGuard, PipelineError> {
    let dir = match log_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let file_name = log_path
        .file_name()
        .ok_or_else(|| PipelineError::config(format!("log_path {} has no file name", log_path.display())))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(EnvFilter::new(stderr_filter));
    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_parent_directories() {
        // The global subscriber can only be installed once per process, so
        // this test owns the single init call for the crate's test binary.
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("logs/nested/run.log");
        let guard = init_logging(&log_path, "info").unwrap();
        tracing::info!("logging initialized");
        drop(guard);
        assert!(log_path.parent().unwrap().exists());
    }
}
