//! Tracing and logging (shared setup).

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use crate::tracing::{LOG_FORMAT_ENV, LogFormat, LogFormatError};

/// Initialize process-wide logging with the format from `WORKWEAR_LOG_FORMAT`
/// (text when unset or unrecognised).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    let format = std::env::var(LOG_FORMAT_ENV)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    crate::tracing::init(format);
}
