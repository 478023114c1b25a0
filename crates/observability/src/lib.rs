//! Tracing/logging (shared setup).

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize process-wide logging with human-readable output.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::Pretty);
}

/// Initialize process-wide logging with an explicit output format.
pub fn init_with(format: LogFormat) {
    tracing::init(format);
}
