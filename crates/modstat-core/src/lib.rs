//! # modstat-core
//!
//! Core types and utilities shared across all modstat crates.
//!
//! This crate provides:
//! - ModstatError enum for the whole error taxonomy
//! - Per-version and per-package roll-up types (VersionInfo, PackageSummary, Summary)
//! - The decoded subset of a tarball's package.json
//! - Path helpers used to validate cache keys
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (VersionInfo, PackageSummary, etc.)
//! - `error`: Error types and result aliases
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{ModstatError, ModstatResult};
pub use types::{
    PackageFailure, PackageFile, PackageSummary, RunReport, Summary, VersionInfo, VersionStat,
};
