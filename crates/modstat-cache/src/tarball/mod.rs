//! Streaming extraction of single files from npm tarballs
//!
//! A tarball is read once, front to back: gzip decoding feeds tar
//! demultiplexing, every entry is drained as it goes by, and only the
//! requested entry is ever buffered.

pub mod extract;
pub mod stream;

/// Path of the manifest inside an npm tarball's top-level directory
pub const PACKAGE_JSON_ENTRY: &str = "package/package.json";

// Re-export main functions
pub use extract::extract_entry;
pub use stream::extract_from_stream;
