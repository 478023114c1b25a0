//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact human-readable lines (terminal use).
    #[default]
    Pretty,
    /// One JSON object per line with timestamps.
    Json,
}

/// Build the filter from `RUST_LOG`, falling back to `default_directive`.
pub fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops). Logs go to
/// stderr so command output on stdout stays machine-readable.
pub fn init(format: LogFormat) {
    let filter = env_filter("info");

    let _ = match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
    };
}
