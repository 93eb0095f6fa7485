//! UI primitives for the Coffer CLI.
//!
//! This module provides:
//! - **Context**: Environment detection (TTY, color, unicode)
//! - **Mode**: Output mode resolution (json, plain, pretty)
//! - **Theme**: Badges and styling
//! - **Render**: Receipts, hints, key-value lines, errors
//! - **Progress**: Spinner
//! - **Format**: Size formatting

mod context;
pub mod format;
pub mod mode;
pub mod progress;
pub mod render;
pub mod theme;

pub use context::UiContext;
pub use theme::Badge;

pub use render::{hint, kv, print, print_error, print_warning, receipt, title};

pub use progress::Spinner;

pub use format::format_megabytes;
