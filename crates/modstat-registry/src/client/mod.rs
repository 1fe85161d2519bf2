//! HTTP client implementation with connection pooling and retry logic

use std::time::Duration;
use reqwest::{Client, ClientBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use modstat_core::error::ModstatError;
use crate::api::{DownloadStats, Packument};
use crate::stream::ByteStream;
use crate::{RegistryResult, DEFAULT_DOWNLOADS_URL, DEFAULT_REGISTRY_URL};

/// Configuration for exponential backoff retry logic
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// Endpoints and policies for a registry client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Registry metadata and search base URL
    pub registry_url: String,
    /// Download statistics API base URL
    pub downloads_url: String,
    /// Retry policy for network operations
    pub retry: RetryConfig,
    /// Per-request timeout, covering the whole body
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            downloads_url: DEFAULT_DOWNLOADS_URL.to_string(),
            retry: RetryConfig::default(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Main HTTP client for npm registry operations
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Retry configuration
    retry_config: RetryConfig,
    /// Base registry URL
    base_url: String,
    /// Base download statistics URL
    downloads_url: String,
}

impl RegistryClient {
    /// Create new registry client against the public npm endpoints
    pub fn new() -> RegistryResult<Self> {
        Self::with_options(ClientOptions::default())
    }

    /// Create registry client with custom configuration
    pub fn with_options(options: ClientOptions) -> RegistryResult<Self> {
        let client = ClientBuilder::new()
            // Connection pooling configuration
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(10))
            .timeout(options.timeout)
            .gzip(true)
            .user_agent(concat!("modstat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ModstatError::network(format!("Failed to create HTTP client: {}", e), e))?;

        Ok(Self {
            client,
            retry_config: options.retry,
            base_url: options.registry_url.trim_end_matches('/').to_string(),
            downloads_url: options.downloads_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base registry URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute an operation with exponential backoff retry logic.
    ///
    /// Only errors for which [`ModstatError::is_recoverable`] holds are retried.
    pub async fn with_retry<F, Fut, T>(&self, operation: F) -> RegistryResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = RegistryResult<T>>,
    {
        let mut delay = self.retry_config.initial_delay;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if attempt >= self.retry_config.max_retries || !error.is_recoverable() {
                        return Err(error);
                    }
                    attempt += 1;
                    warn!(
                        "attempt {}/{} failed, retrying in {:?}: {}",
                        attempt, self.retry_config.max_retries, delay, error
                    );

                    tokio::time::sleep(delay).await;

                    delay = std::cmp::min(
                        Duration::from_millis(
                            (delay.as_millis() as f64 * self.retry_config.multiplier) as u64
                        ),
                        self.retry_config.max_delay
                    );
                }
            }
        }
    }

    /// Issue a GET and fail on any non-success status without reading the body
    async fn get(&self, url: &str, accept: Option<&str>) -> RegistryResult<Response> {
        debug!("GET {}", url);
        let mut request = self.client.get(url);
        if let Some(accept) = accept {
            request = request.header(reqwest::header::ACCEPT, accept);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ModstatError::network(format!("Failed to GET {}: {}", url, e), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModstatError::Retrieval {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    /// Single attempt: GET, buffer the body, decode as JSON
    async fn get_json<T: DeserializeOwned>(&self, url: &str, accept: Option<&str>) -> RegistryResult<T> {
        let response = self.get(url, accept).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| ModstatError::network(format!("Failed to read body of {}: {}", url, e), e))?;

        serde_json::from_slice(&body).map_err(|source| ModstatError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Fetch a URL and decode its body as JSON, with retry
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> RegistryResult<T> {
        self.with_retry(|| self.get_json(url, None)).await
    }

    /// Open a URL and return the live response body.
    ///
    /// Not retried: a stream can only be consumed once, so callers retry the
    /// whole open-and-consume operation instead (see [`Self::download_entry`]).
    pub async fn fetch_raw(&self, url: &str) -> RegistryResult<ByteStream> {
        let response = self.get(url, None).await?;
        Ok(ByteStream::new(url, response))
    }

    /// Stream a tarball and decode one JSON entry from it, with retry
    pub async fn download_entry<T>(&self, tarball_url: &str, entry: &str) -> RegistryResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.with_retry(|| async {
            self.fetch_raw(tarball_url).await?.extract_entry(entry).await
        })
        .await
    }

    /// Fetch the (abbreviated) packument for a package, with retry
    pub async fn fetch_packument(&self, package_name: &str) -> RegistryResult<Packument> {
        let url = self.packument_url(package_name);
        self.with_retry(|| self.get_json(&url, Some("application/vnd.npm.install-v1+json")))
            .await
    }

    /// Fetch last-week per-version download counts, with retry
    pub async fn fetch_download_stats(&self, package_name: &str) -> RegistryResult<DownloadStats> {
        let url = self.download_stats_url(package_name);
        self.with_retry(|| self.get_json(&url, None)).await
    }

    /// Packument URL for a package
    pub fn packument_url(&self, package_name: &str) -> String {
        format!("{}/{}", self.base_url, self.encode_package_name(package_name))
    }

    /// Download statistics URL for a package
    pub fn download_stats_url(&self, package_name: &str) -> String {
        format!(
            "{}/versions/{}/last-week",
            self.downloads_url,
            encode_uri_component(package_name)
        )
    }

    /// Encode package name for URL (handle scoped packages)
    fn encode_package_name(&self, name: &str) -> String {
        if name.starts_with('@') {
            // Scoped package: @org/pkg → @org%2fpkg
            name.replace('/', "%2f")
        } else {
            name.to_string()
        }
    }
}

/// Percent-encode every byte outside the set JavaScript's
/// `encodeURIComponent` leaves alone, so `@scope/name` becomes `%40scope%2Fname`.
fn encode_uri_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
