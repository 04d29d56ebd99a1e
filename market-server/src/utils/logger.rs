//! Logging Infrastructure
//!
//! `RUST_LOG` overrides the configured level. With a log directory the
//! output goes to a daily rolling file instead of stdout.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initialize the logger at `info`
pub fn init_logger() -> Option<WorkerGuard> {
    init_logger_with_file(None, None)
}

/// Initialize the logger with optional file output
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process. `try_init` makes repeated calls (tests) harmless.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) -> Option<WorkerGuard> {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if std::fs::create_dir_all(log_path).is_ok() {
            let file_appender = tracing_appender::rolling::daily(log_path, "market-server");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            let _ = builder.with_ansi(false).with_writer(writer).try_init();
            return Some(guard);
        }
        eprintln!("Log directory {} is not writable, logging to stdout", dir);
    }

    let _ = builder.try_init();
    None
}
