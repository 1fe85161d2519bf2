//! Core data types for modstat.
//!
//! This module provides the fundamental types used throughout modstat:
//! - The decoded package.json subset read from each tarball
//! - Per-version download/format records and their roll-ups

pub mod package;
pub mod summary;

// Re-export all public types
pub use package::{PackageFile, ESM_MODULE_TYPE};
pub use summary::{PackageFailure, PackageSummary, RunReport, Summary, VersionInfo, VersionStat};
