//! String formatting utilities for UI rendering.

/// Size in megabytes with two decimals, e.g. `12.34 MB`.
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}
