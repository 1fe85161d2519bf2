//! npm registry API response types
//!
//! Only the fields the analysis reads are modelled. Unknown fields are
//! ignored on the way in, so cached documents hold just this subset.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// Package metadata (packument) from the registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Packument {
    /// Package name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// All published versions; absent for fully unpublished packages
    #[serde(default)]
    pub versions: BTreeMap<String, PackumentVersion>,
}

impl Packument {
    /// Tarball URL for a published version
    pub fn tarball_url(&self, version: &str) -> Option<&str> {
        self.versions
            .get(version)
            .map(|metadata| metadata.dist.tarball.as_str())
    }
}

/// Metadata for a specific package version
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PackumentVersion {
    /// Distribution information
    pub dist: DistInfo,
}

/// Distribution information for package tarball
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DistInfo {
    /// Tarball download URL
    pub tarball: String,
}

/// Per-version download counts over the last week
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DownloadStats {
    /// Package name as echoed by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Version tag → downloads, in ascending lexical order of the tag
    #[serde(default)]
    pub downloads: BTreeMap<String, u64>,
}

impl DownloadStats {
    /// Sum of downloads across every version
    pub fn total(&self) -> u64 {
        self.downloads.values().sum()
    }
}

/// One page of registry search results
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchResponse {
    /// Matching packages
    #[serde(default)]
    pub objects: Vec<SearchObject>,
    /// Total number of matches across all pages
    #[serde(default)]
    pub total: Option<u64>,
}

/// A single search hit
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchObject {
    /// Package summary
    pub package: SearchPackage,
}

/// Package summary inside a search hit
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchPackage {
    /// Package name
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packument_keeps_only_tarballs() {
        let packument: Packument = serde_json::from_value(serde_json::json!({
            "name": "a",
            "dist-tags": { "latest": "1.0.0" },
            "versions": {
                "1.0.0": {
                    "version": "1.0.0",
                    "dependencies": { "b": "^2.0.0" },
                    "dist": {
                        "tarball": "https://registry.npmjs.org/a/-/a-1.0.0.tgz",
                        "shasum": "abc123"
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(
            packument.tarball_url("1.0.0"),
            Some("https://registry.npmjs.org/a/-/a-1.0.0.tgz")
        );
        assert_eq!(packument.tarball_url("2.0.0"), None);

        let persisted = serde_json::to_value(&packument).unwrap();
        assert!(persisted.get("dist-tags").is_none());
        assert!(persisted["versions"]["1.0.0"].get("dependencies").is_none());
    }

    #[test]
    fn test_unpublished_packument_has_no_versions() {
        let packument: Packument =
            serde_json::from_str(r#"{"name":"gone","time":{"unpublished":{}}}"#).unwrap();
        assert!(packument.versions.is_empty());
    }

    #[test]
    fn test_download_stats_total() {
        let stats: DownloadStats = serde_json::from_str(
            r#"{"package":"a","downloads":{"1.0.0":100,"0.1.0":5,"0.0.1":0}}"#,
        )
        .unwrap();
        assert_eq!(stats.total(), 105);
        let order: Vec<_> = stats.downloads.keys().cloned().collect();
        assert_eq!(order, vec!["0.0.1", "0.1.0", "1.0.0"]);
    }
}
