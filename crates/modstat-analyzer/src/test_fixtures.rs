//! Fake registry shared by analyzer tests

use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use flate2::write::GzEncoder;
use flate2::Compression;
use modstat_cache::MemoStore;
use modstat_registry::{ClientOptions, RegistryClient, RetryConfig};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::VersionAnalyzer;

/// One published version: tag, weekly downloads, `type` field
pub(crate) type Release<'a> = (&'a str, u64, Option<&'a str>);

/// Mock registry, download API and tarball host backed by one server
pub(crate) struct FakeRegistry {
    pub server: MockServer,
    pub temp_dir: TempDir,
}

impl FakeRegistry {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            temp_dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn cache_root(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.temp_dir.path().join("cache")).unwrap()
    }

    pub fn client(&self) -> Arc<RegistryClient> {
        Arc::new(
            RegistryClient::with_options(ClientOptions {
                registry_url: self.server.uri(),
                downloads_url: self.server.uri(),
                retry: RetryConfig {
                    max_retries: 1,
                    initial_delay: Duration::from_millis(1),
                    max_delay: Duration::from_millis(2),
                    multiplier: 2.0,
                },
                timeout: Duration::from_secs(5),
            })
            .unwrap(),
        )
    }

    pub fn analyzer(&self) -> VersionAnalyzer {
        VersionAnalyzer::new(self.client(), Arc::new(MemoStore::new(self.cache_root())))
    }

    fn local_path(&self, url: &str) -> String {
        url.trim_start_matches(&self.server.uri()).to_string()
    }

    pub fn tarball_url(&self, name: &str, version: &str) -> String {
        let base = name.rsplit('/').next().unwrap_or(name);
        format!("{}/{}/-/{}-{}.tgz", self.server.uri(), name, base, version)
    }

    /// Serve packument, download stats and tarballs for a package
    pub async fn publish(&self, name: &str, releases: &[Release<'_>]) {
        self.publish_metadata(name, releases, releases).await;
        for (version, _, module_type) in releases {
            let mut manifest = serde_json::json!({ "name": name, "version": version });
            if let Some(module_type) = module_type {
                manifest["type"] = serde_json::json!(module_type);
            }
            self.serve_tarball(
                name,
                version,
                &[
                    ("package/index.js", b"module.exports = {};".to_vec()),
                    ("package/package.json", serde_json::to_vec(&manifest).unwrap()),
                ],
            )
            .await;
        }
    }

    /// Serve a packument listing `listed` and stats covering `downloaded`
    pub async fn publish_metadata(&self, name: &str, listed: &[Release<'_>], downloaded: &[Release<'_>]) {
        let client = self.client();

        let versions: serde_json::Map<String, serde_json::Value> = listed
            .iter()
            .map(|(version, _, _)| {
                (
                    version.to_string(),
                    serde_json::json!({
                        "version": version,
                        "dist": { "tarball": self.tarball_url(name, version), "shasum": "x" }
                    }),
                )
            })
            .collect();
        Mock::given(method("GET"))
            .and(path(self.local_path(&client.packument_url(name))))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": name,
                "versions": versions
            })))
            .mount(&self.server)
            .await;

        let downloads: serde_json::Map<String, serde_json::Value> = downloaded
            .iter()
            .map(|(version, count, _)| (version.to_string(), serde_json::json!(count)))
            .collect();
        Mock::given(method("GET"))
            .and(path(self.local_path(&client.download_stats_url(name))))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "package": name,
                "downloads": downloads
            })))
            .mount(&self.server)
            .await;
    }

    /// Serve a tarball with the given entries
    pub async fn serve_tarball(&self, name: &str, version: &str, entries: &[(&str, Vec<u8>)]) {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (entry_path, contents) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_path(entry_path).unwrap();
            header.set_size(contents.len() as u64);
            header.set_cksum();
            builder.append(&header, contents.as_slice()).unwrap();
        }
        let tarball = builder.into_inner().unwrap().finish().unwrap();

        Mock::given(method("GET"))
            .and(path(self.local_path(&self.tarball_url(name, version))))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(tarball))
            .mount(&self.server)
            .await;
    }

    /// Requests received so far whose path ends in `.tgz`
    pub async fn tarball_requests(&self) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path().ends_with(".tgz"))
            .count()
    }

    /// Total requests received so far
    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.map(|r| r.len()).unwrap_or(0)
    }
}
