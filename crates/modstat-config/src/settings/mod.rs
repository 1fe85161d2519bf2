//! modstat.toml parsing and the resolved configuration

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use modstat_analyzer::{DEFAULT_CONCURRENCY, DEFAULT_TOP_N};
use modstat_core::error::ModstatError;
use modstat_registry::{ClientOptions, RetryConfig, DEFAULT_DOWNLOADS_URL, DEFAULT_REGISTRY_URL};
use serde::{Deserialize, Serialize};

use crate::ConfigResult;

/// File name looked up in the working directory and its ancestors
pub const CONFIG_FILE_NAME: &str = "modstat.toml";

/// One modstat.toml file. Every field is optional so files can be layered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ModstatToml {
    /// Root of the memoization store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<Utf8PathBuf>,

    /// Packages analyzed at once
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Size of the ESM/CommonJS rankings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<isize>,

    /// Remote endpoints and request policy
    #[serde(default)]
    pub registry: RegistrySection,
}

/// `[registry]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RegistrySection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloads_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    /// Delay before the first retry, in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_delay_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ModstatToml {
    /// Fill every unset field of `self` from `lower`
    pub fn or(self, lower: ModstatToml) -> ModstatToml {
        ModstatToml {
            cache_dir: self.cache_dir.or(lower.cache_dir),
            concurrency: self.concurrency.or(lower.concurrency),
            top: self.top.or(lower.top),
            registry: RegistrySection {
                url: self.registry.url.or(lower.registry.url),
                downloads_url: self.registry.downloads_url.or(lower.registry.downloads_url),
                max_retries: self.registry.max_retries.or(lower.registry.max_retries),
                retry_delay_ms: self.registry.retry_delay_ms.or(lower.registry.retry_delay_ms),
                timeout_secs: self.registry.timeout_secs.or(lower.registry.timeout_secs),
            },
        }
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub cache_dir: Utf8PathBuf,
    pub concurrency: usize,
    pub top_n: isize,
    pub registry_url: String,
    pub downloads_url: String,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        let retry = RetryConfig::default();
        let client = ClientOptions::default();
        Self {
            cache_dir: default_cache_dir(),
            concurrency: DEFAULT_CONCURRENCY,
            top_n: DEFAULT_TOP_N,
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            downloads_url: DEFAULT_DOWNLOADS_URL.to_string(),
            max_retries: retry.max_retries,
            retry_delay: retry.initial_delay,
            timeout: client.timeout,
        }
    }
}

impl Config {
    /// Resolve a layered file against the built-in defaults
    pub fn from_toml(file: ModstatToml) -> ConfigResult<Self> {
        let defaults = Config::default();
        let config = Config {
            cache_dir: file.cache_dir.unwrap_or(defaults.cache_dir),
            concurrency: file.concurrency.unwrap_or(defaults.concurrency),
            top_n: file.top.unwrap_or(defaults.top_n),
            registry_url: file.registry.url.unwrap_or(defaults.registry_url),
            downloads_url: file.registry.downloads_url.unwrap_or(defaults.downloads_url),
            max_retries: file.registry.max_retries.unwrap_or(defaults.max_retries),
            retry_delay: file
                .registry
                .retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
            timeout: file
                .registry
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but cannot be used
    pub fn validate(&self) -> ConfigResult<()> {
        if self.concurrency == 0 {
            return Err(ModstatError::ConfigValidation {
                field: "concurrency".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.timeout.is_zero() {
            return Err(ModstatError::ConfigValidation {
                field: "registry.timeout-secs".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        for (field, url) in [
            ("registry.url", &self.registry_url),
            ("registry.downloads-url", &self.downloads_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ModstatError::ConfigValidation {
                    field: field.to_string(),
                    reason: format!("'{}' is not an http(s) URL", url),
                });
            }
        }
        Ok(())
    }

    /// Options for building a registry client
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            registry_url: self.registry_url.clone(),
            downloads_url: self.downloads_url.clone(),
            retry: RetryConfig {
                max_retries: self.max_retries,
                initial_delay: self.retry_delay,
                ..RetryConfig::default()
            },
            timeout: self.timeout,
        }
    }
}

/// `<user cache dir>/modstat`, or `./cache` when the platform has none
pub fn default_cache_dir() -> Utf8PathBuf {
    dirs::cache_dir()
        .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
        .map(|dir| dir.join("modstat"))
        .unwrap_or_else(|| Utf8PathBuf::from("cache"))
}

/// Parse a modstat.toml document
pub fn parse_modstat_toml(content: &str) -> ConfigResult<ModstatToml> {
    toml::from_str(content).map_err(|e| ModstatError::ConfigParse {
        path: CONFIG_FILE_NAME.to_string(),
        message: e.to_string(),
    })
}

/// Load a modstat.toml file. A relative `cache-dir` is taken relative to
/// the directory holding the file.
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<ModstatToml> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ModstatError::io(format!("Failed to read {}", path), e))?;

    let mut file = parse_modstat_toml(&content).map_err(|e| match e {
        ModstatError::ConfigParse { message, .. } => ModstatError::ConfigParse {
            path: path.to_string(),
            message,
        },
        other => other,
    })?;

    let anchored = match (&file.cache_dir, path.parent()) {
        (Some(cache_dir), Some(parent)) if cache_dir.is_relative() => Some(parent.join(cache_dir)),
        _ => None,
    };
    if anchored.is_some() {
        file.cache_dir = anchored;
    }

    Ok(file)
}
