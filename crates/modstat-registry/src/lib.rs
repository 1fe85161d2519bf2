//! npm registry client for modstat
//!
//! This crate fetches package metadata, weekly download statistics and
//! tarballs, with retry and exponential backoff for transient failures, and
//! streams tarball bodies straight into the extraction pipeline.

pub mod client;
pub mod api;
pub mod search;
pub mod stream;

// Re-export main types
pub use client::{ClientOptions, RegistryClient, RetryConfig};
pub use api::{DistInfo, DownloadStats, Packument, PackumentVersion, SearchResponse};
pub use stream::ByteStream;

use modstat_core::error::ModstatError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, ModstatError>;

/// Default npm registry URL
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Default npm download statistics API URL
pub const DEFAULT_DOWNLOADS_URL: &str = "https://api.npmjs.org";
