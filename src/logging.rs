use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants::{LOG_DIR, LOG_FILE};

/// Initializes the logging system with file output and, when `RUST_LOG` is
/// set, console output on stderr.
///
/// The report and prompts own stdout, so console logging is opt-in. The
/// returned guard must be held until exit so buffered file logs are flushed.
pub fn init_logging(root: &Path) -> WorkerGuard {
    let log_dir = root.join(LOG_DIR);
    let _ = fs::create_dir_all(&log_dir);

    // Non-blocking file appender with daily rotation
    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    let (env_filter, console_layer) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (
            filter,
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            ),
        ),
        Err(_) => (EnvFilter::new("guild_overlap=debug,info"), None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}
