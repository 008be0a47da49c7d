//! Tracing/logging setup shared by the binaries.

/// Initialize process-wide tracing with a caller-chosen default level.
///
/// `RUST_LOG` takes precedence when set. Safe to call multiple times;
/// subsequent calls become no-ops.
pub fn init(default_level: &str) {
    tracing::init(default_level);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
