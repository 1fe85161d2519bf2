//! Extraction from an async byte stream
//!
//! gzip and tar decoding are synchronous, so extraction runs on a blocking
//! thread that reads the stream through `SyncIoBridge`. Chunks are pulled on
//! demand, so only the chunk being decoded is held in memory.

use bytes::Bytes;
use futures::Stream;
use modstat_core::error::ModstatError;
use serde::de::DeserializeOwned;
use std::io;
use tokio_util::io::{StreamReader, SyncIoBridge};

use super::extract::extract_entry;
use crate::CacheResult;

/// Extract `target` from a gzip-compressed tar arriving as `stream`.
///
/// Must be called from within a Tokio runtime. An `Err` item aborts the
/// extraction; a stream that ends without the entry yields `EntryNotFound`.
pub async fn extract_from_stream<S, T>(stream: S, target: &str) -> CacheResult<T>
where
    S: Stream<Item = io::Result<Bytes>> + Send + Unpin + 'static,
    T: DeserializeOwned + Send + 'static,
{
    let reader = SyncIoBridge::new(StreamReader::new(stream));
    let target = target.to_string();

    tokio::task::spawn_blocking(move || extract_entry(reader, &target))
        .await
        .map_err(|e| ModstatError::Worker {
            message: format!("Tarball extraction task failed: {}", e),
        })?
}
