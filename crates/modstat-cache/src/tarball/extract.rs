//! Single-entry extraction from a gzipped tarball

use flate2::read::GzDecoder;
use modstat_core::error::ModstatError;
use serde::de::DeserializeOwned;
use std::io::{self, Read};
use std::path::Path;
use tar::Archive;
use tracing::trace;

use crate::CacheResult;

/// Find `target` in a gzipped tarball and decode it as JSON.
///
/// Entries are visited in archive order and each one is drained before the
/// next is read, so memory use stays at one entry regardless of archive size.
/// When the entry appears more than once the last copy wins. Once the tar
/// stream ends, the rest of the gzip stream is read to EOF so a bad trailer or
/// checksum is reported even if every entry looked fine.
pub fn extract_entry<R, T>(reader: R, target: &str) -> CacheResult<T>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut archive = Archive::new(GzDecoder::new(reader));
    let target_path = Path::new(target);
    let mut found = None;

    let entries = archive
        .entries()
        .map_err(|e| ModstatError::extraction("Failed to read tarball entries".to_string(), e))?;

    for entry_result in entries {
        let mut entry = entry_result
            .map_err(|e| ModstatError::extraction("Failed to read tarball entry".to_string(), e))?;

        let is_target = entry
            .path()
            .map_err(|e| ModstatError::extraction("Failed to read entry path".to_string(), e))?
            == target_path;

        if is_target {
            let mut contents = Vec::new();
            entry
                .read_to_end(&mut contents)
                .map_err(|e| ModstatError::extraction(format!("Failed to read {}", target), e))?;
            let value = serde_json::from_slice(&contents).map_err(|source| ModstatError::Decode {
                url: target.to_string(),
                source,
            })?;
            found = Some(value);
        }

        let skipped = io::copy(&mut entry, &mut io::sink())
            .map_err(|e| ModstatError::extraction("Failed to drain tarball entry".to_string(), e))?;
        trace!("drained {} bytes of entry", skipped);
    }

    let mut decoder = archive.into_inner();
    io::copy(&mut decoder, &mut io::sink())
        .map_err(|e| ModstatError::extraction("Failed to finish decompression".to_string(), e))?;

    found.ok_or_else(|| ModstatError::EntryNotFound {
        entry: target.to_string(),
    })
}
