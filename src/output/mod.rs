//! Output formatters for run results.
//!
//! - [`text`]: human-readable summary ending in `Created N symlinks`
//! - [`json`]: machine-readable report for scripting

pub mod json;
pub mod text;

// Re-export main types
pub use json::JsonOutput;
pub use text::TextOutput;
