//! Utility functions and helpers.
//!
//! Common functionality used across multiple modstat crates.

pub mod path;

// Re-export commonly used utilities
pub use path::{is_safe_path, safe_join};
