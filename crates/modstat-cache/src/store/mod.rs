//! Read-through, write-once JSON memoization on disk
//!
//! Every value is stored as a pretty-printed JSON document at a path derived
//! from its key under the store root. Entries never expire; deleting a file
//! (or a whole domain via `modstat clean`) is the only invalidation.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use modstat_core::error::{ModstatError, ModstatResult};
use modstat_core::utils::safe_join;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::CacheResult;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Top-level partitions of the cache directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDomain {
    /// Package names found by author search
    PackagesByAuthor,
    /// Version → tarball URL metadata
    Packuments,
    /// Last-week download counts per version
    DownloadStats,
    /// package.json extracted from each version's tarball
    PackageFiles,
}

impl CacheDomain {
    /// All domains, in the order `modstat clean` reports them
    pub const ALL: [CacheDomain; 4] = [
        CacheDomain::PackagesByAuthor,
        CacheDomain::Packuments,
        CacheDomain::DownloadStats,
        CacheDomain::PackageFiles,
    ];

    /// Directory name under the store root
    pub fn dir(&self) -> &'static str {
        match self {
            CacheDomain::PackagesByAuthor => "packages-by-author",
            CacheDomain::Packuments => "packuments",
            CacheDomain::DownloadStats => "download-stats",
            CacheDomain::PackageFiles => "package-files",
        }
    }

    /// Key for a per-author or per-package document in this domain
    pub fn key(&self, name: &str) -> String {
        format!("{}/{}.json", self.dir(), name)
    }

    /// Key for the package.json of one published version
    pub fn package_file_key(package: &str, version: &str) -> String {
        format!(
            "{}/{}/{}/package.json",
            CacheDomain::PackageFiles.dir(),
            package,
            version
        )
    }
}

/// On-disk memoization store
#[derive(Debug, Clone)]
pub struct MemoStore {
    /// Root directory for all cache domains
    root_path: Utf8PathBuf,
}

impl MemoStore {
    /// Create a store rooted at the given directory; nothing is created until the first write
    pub fn new<P: AsRef<Utf8Path>>(root_path: P) -> Self {
        Self {
            root_path: root_path.as_ref().to_path_buf(),
        }
    }

    /// Get the root path of the store
    pub fn root_path(&self) -> &Utf8Path {
        &self.root_path
    }

    /// Resolve a key to its file path
    pub fn path_for(&self, key: &str) -> CacheResult<PathBuf> {
        safe_join(self.root_path.as_std_path(), key)
    }

    /// Check whether a value has been persisted under `key`
    pub async fn contains(&self, key: &str) -> CacheResult<bool> {
        let path = self.path_for(key)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| ModstatError::io(format!("Failed to stat {}", path.display()), e))
    }

    /// Read a persisted value, if any
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let path = self.path_for(key)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ModstatError::io(
                    format!("Failed to read cache file {}", path.display()),
                    e,
                ))
            }
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ModstatError::Decode {
                url: path.display().to_string(),
                source,
            })
    }

    /// Persist a value under `key`, creating intermediate directories
    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> CacheResult<()> {
        let path = self.path_for(key)?;
        let parent = path.parent().unwrap_or(self.root_path.as_std_path());
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ModstatError::io(format!("Failed to create {}", parent.display()), e))?;

        let mut json = serde_json::to_vec_pretty(value).map_err(|source| ModstatError::Decode {
            url: path.display().to_string(),
            source,
        })?;
        json.push(b'\n');

        // Write beside the target and rename so readers never see a partial document.
        let temp_path = temp_sibling(&path);
        tokio::fs::write(&temp_path, &json)
            .await
            .map_err(|e| ModstatError::io(format!("Failed to write {}", temp_path.display()), e))?;
        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(ModstatError::io(
                format!("Failed to move cache file into place at {}", path.display()),
                e,
            ));
        }

        Ok(())
    }

    /// Return the value stored under `key`, computing and persisting it on a miss.
    ///
    /// `compute` runs at most once per call and only when nothing is stored yet.
    /// If it fails nothing is written and the error is returned unchanged, so a
    /// later call with the same key computes again. There is no locking: two
    /// concurrent first-time callers may both compute, and the last write wins.
    pub async fn get_or_compute<T, F, Fut>(&self, key: &str, compute: F) -> ModstatResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ModstatResult<T>>,
    {
        if let Some(value) = self.get(key).await? {
            debug!("cache hit: {}", key);
            return Ok(value);
        }

        debug!("cache miss: {}", key);
        let value = compute().await?;
        self.put(key, &value).await?;
        Ok(value)
    }

    /// Delete every entry in one domain; returns whether anything was removed
    pub async fn remove_domain(&self, domain: CacheDomain) -> CacheResult<bool> {
        let path = self.root_path.join(domain.dir());
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ModstatError::io(format!("Failed to remove {}", path), e)),
        }
    }

    /// Delete every domain
    pub async fn clear(&self) -> CacheResult<usize> {
        let mut removed = 0;
        for domain in CacheDomain::ALL {
            if self.remove_domain(domain).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(
        ".{}.tmp-{}-{}",
        file_name,
        std::process::id(),
        counter
    ))
}
