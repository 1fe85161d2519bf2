//! Durable memoization and archive extraction for modstat
//!
//! This crate provides the on-disk JSON cache that makes interrupted runs
//! cheap to resume, and the streaming gzip/tar pipeline that pulls a single
//! file out of a package tarball without unpacking the rest.

pub mod store;
pub mod tarball;

// Re-export main types
pub use store::{CacheDomain, MemoStore};
pub use tarball::{extract_entry, extract_from_stream, PACKAGE_JSON_ENTRY};

use modstat_core::error::ModstatError;

/// Result type for cache operations
pub type CacheResult<T> = Result<T, ModstatError>;
