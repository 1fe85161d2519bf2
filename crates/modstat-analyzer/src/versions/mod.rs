//! Per-package version analysis
//!
//! Joins a package's weekly download counts with its packument and reads
//! each downloaded version's package.json out of its tarball. Every remote
//! lookup goes through the memoization store, so a re-run only touches the
//! network for what an earlier run did not finish.

use std::sync::Arc;

use modstat_cache::{CacheDomain, MemoStore, PACKAGE_JSON_ENTRY};
use modstat_core::error::ModstatError;
use modstat_core::{PackageFile, PackageSummary, VersionInfo};
use modstat_registry::{DownloadStats, Packument, RegistryClient};
use tracing::{debug, instrument};

use crate::AnalyzerResult;

/// Classifies the downloaded versions of a package
#[derive(Debug, Clone)]
pub struct VersionAnalyzer {
    client: Arc<RegistryClient>,
    store: Arc<MemoStore>,
}

impl VersionAnalyzer {
    /// Create an analyzer over a registry client and a cache
    pub fn new(client: Arc<RegistryClient>, store: Arc<MemoStore>) -> Self {
        Self { client, store }
    }

    /// Registry client used for network lookups
    pub fn client(&self) -> &RegistryClient {
        &self.client
    }

    /// Cache used for every lookup
    pub fn store(&self) -> &MemoStore {
        &self.store
    }

    /// Packument for a package, cached indefinitely
    pub async fn packument(&self, package_name: &str) -> AnalyzerResult<Packument> {
        self.store
            .get_or_compute(&CacheDomain::Packuments.key(package_name), || {
                self.client.fetch_packument(package_name)
            })
            .await
    }

    /// Last-week download counts for a package.
    ///
    /// The cache key does not include the week, so a cached value is reused
    /// until `download-stats/` is cleared.
    pub async fn download_stats(&self, package_name: &str) -> AnalyzerResult<DownloadStats> {
        self.store
            .get_or_compute(&CacheDomain::DownloadStats.key(package_name), || {
                self.client.fetch_download_stats(package_name)
            })
            .await
    }

    /// package.json of one published version, read from its tarball
    pub async fn package_file(
        &self,
        package_name: &str,
        version: &str,
        tarball_url: &str,
    ) -> AnalyzerResult<PackageFile> {
        self.store
            .get_or_compute(
                &CacheDomain::package_file_key(package_name, version),
                || self.client.download_entry(tarball_url, PACKAGE_JSON_ENTRY),
            )
            .await
    }

    /// Downloads and module format for every version downloaded last week.
    ///
    /// Every version in the download stats must appear in the packument, even
    /// one with no downloads. Versions are then visited one at a time in
    /// ascending lexical order; versions with no downloads are skipped without
    /// fetching their tarball. Any failure aborts the whole package.
    #[instrument(skip(self), level = "debug")]
    pub async fn analyze_versions(&self, package_name: &str) -> AnalyzerResult<VersionInfo> {
        let packument = self.packument(package_name).await?;
        let stats = self.download_stats(package_name).await?;
        debug!("{}: {} weekly downloads", package_name, stats.total());

        let mut downloaded = Vec::with_capacity(stats.downloads.len());
        for (version, &downloads) in &stats.downloads {
            let tarball_url =
                packument
                    .tarball_url(version)
                    .ok_or_else(|| ModstatError::MissingVersion {
                        package: package_name.to_string(),
                        version: version.clone(),
                    })?;
            if downloads > 0 {
                downloaded.push((version, downloads, tarball_url));
            }
        }

        let mut info = VersionInfo::new(package_name);
        for (version, downloads, tarball_url) in downloaded {
            let file = self.package_file(package_name, version, tarball_url).await?;
            debug!("{}@{}: {} downloads, esm={}", package_name, version, downloads, file.is_esm());
            info.insert(version.clone(), downloads, file.is_esm());
        }

        Ok(info)
    }

    /// Download-weighted ESM/CommonJS split for a package
    pub async fn analyze_package(&self, package_name: &str) -> AnalyzerResult<PackageSummary> {
        Ok(self.analyze_versions(package_name).await?.summarize())
    }
}
