//! Download-weighted module format roll-ups.
//!
//! `VersionInfo` is the per-package result of analysis; `PackageSummary`
//! folds it into ESM and CommonJS download totals, and `Summary` folds
//! package summaries into author-level totals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Weekly downloads and module format of one published version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionStat {
    pub downloads: u64,
    pub is_esm: bool,
}

/// Per-version download counts and formats for one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub package_name: String,
    /// Keyed by version tag, in ascending lexical order
    pub versions: BTreeMap<String, VersionStat>,
}

impl VersionInfo {
    /// Create an empty record for a package
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            versions: BTreeMap::new(),
        }
    }

    /// Record one version's downloads and format
    pub fn insert(&mut self, version: impl Into<String>, downloads: u64, is_esm: bool) {
        self.versions
            .insert(version.into(), VersionStat { downloads, is_esm });
    }

    /// Roll the versions up into ESM and CommonJS totals
    pub fn summarize(&self) -> PackageSummary {
        let (esm, cjs) = self
            .versions
            .values()
            .fold((0u64, 0u64), |(esm, cjs), stat| {
                if stat.is_esm {
                    (esm + stat.downloads, cjs)
                } else {
                    (esm, cjs + stat.downloads)
                }
            });

        PackageSummary {
            package_name: self.package_name.clone(),
            num_versions: self.versions.len(),
            downloads: esm + cjs,
            esm,
            cjs,
        }
    }
}

/// Download totals for one package, split by module format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSummary {
    pub package_name: String,
    pub num_versions: usize,
    pub downloads: u64,
    pub esm: u64,
    pub cjs: u64,
}

/// Author-level totals over every package with downloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub author_name: String,
    pub packages: Vec<PackageSummary>,
    pub total_packages: usize,
    pub total_versions: usize,
    pub total_downloads: u64,
    pub total_esm: u64,
    pub total_cjs: u64,
    /// NaN when there were no downloads at all
    pub percent_esm: f64,
    pub top_esm: Vec<PackageSummary>,
    pub top_cjs: Vec<PackageSummary>,
}

/// A package whose analysis failed, with the rendered error chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageFailure {
    pub package_name: String,
    pub error: String,
}

/// Outcome of a whole run: the summary plus what could not be analyzed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub summary: Summary,
    /// Every package attempted, including those with zero downloads or failures
    pub processed: usize,
    pub failures: Vec<PackageFailure>,
}

impl RunReport {
    /// Whether every package was analyzed
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
