//! `tracing` subscriber setup for the poller.
//!
//! Console output is human-readable. When a log directory is given, every
//! event is also written as one JSON object per line to a daily-rotating file
//! `{log_dir}/{module_name}.YYYY-MM-DD`, through a non-blocking writer so a
//! slow disk never stalls a refresh cycle.
//!
//! `RUST_LOG` takes precedence over the level passed in.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Call once at program start.
///
/// Returns the file writer guard when file output is enabled; keep it alive
/// until shutdown or buffered lines are lost.
pub fn init_logging(log_level: &str, log_dir: Option<&str>, module_name: &str) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let console_layer = fmt::layer().with_target(true).with_ansi(true);

    match log_dir {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, module_name));
            let file_layer = fmt::layer().json().with_writer(writer).with_ansi(false).with_target(true);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .with(file_layer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(env_filter).with(console_layer).init();
            None
        }
    }
}
