//! Tracing/logging setup shared by the binaries.

/// Subscriber configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogFormat, LogOptions};

/// Initialize process-wide logging with the given options.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init_with(options: &LogOptions) {
    tracing::init_with(options);
}
