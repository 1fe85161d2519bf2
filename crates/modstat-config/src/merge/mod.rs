//! Configuration layering, fallback logic, and environment overrides

use std::collections::HashMap;

use camino::Utf8PathBuf;
use modstat_core::error::ModstatError;
use tracing::debug;

use crate::settings::{self, Config, ModstatToml, CONFIG_FILE_NAME};
use crate::ConfigResult;

/// Environment variables consulted by [`ConfigLayering::collect_env_overrides`]
pub const ENV_CACHE_DIR: &str = "MODSTAT_CACHE_DIR";
pub const ENV_CONCURRENCY: &str = "MODSTAT_CONCURRENCY";
pub const ENV_REGISTRY: &str = "MODSTAT_REGISTRY";
pub const ENV_DOWNLOADS_API: &str = "MODSTAT_DOWNLOADS_API";

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
}

/// Configuration layering and merging
pub struct ConfigLayering;

/// Where the project layer came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Explicit `--config` file
    Explicit(Utf8PathBuf),
    /// modstat.toml found from the working directory
    Project(Utf8PathBuf),
    /// Global config file
    Global(Utf8PathBuf),
    /// Built-in defaults only
    Defaults,
}

/// Values given as command-line flags, the highest-priority layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub cache_dir: Option<Utf8PathBuf>,
    pub concurrency: Option<usize>,
    pub top: Option<isize>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self { cwd }
    }

    /// Loader rooted at the process working directory
    pub fn from_current_dir() -> ConfigResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| ModstatError::io("Failed to read current directory".to_string(), e))?;
        let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(|path| ModstatError::ConfigValidation {
            field: "cwd".to_string(),
            reason: format!("{} is not valid UTF-8", path.display()),
        })?;
        Ok(Self::new(cwd))
    }

    /// Find the nearest modstat.toml in the working directory or its ancestors
    pub fn find_project_config(&self) -> Option<Utf8PathBuf> {
        self.cwd
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Path of the per-user config file
    pub fn global_config_path() -> Option<Utf8PathBuf> {
        dirs::config_dir()
            .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
            .map(|dir| dir.join("modstat").join("config.toml"))
    }

    /// Load the project layer: an explicit file, else the nearest modstat.toml
    pub async fn load_project_config(
        &self,
        explicit: Option<&Utf8PathBuf>,
    ) -> ConfigResult<Option<(ModstatToml, ConfigSource)>> {
        if let Some(path) = explicit {
            let path = self.cwd.join(path);
            let file = settings::load_from_file(&path).await?;
            return Ok(Some((file, ConfigSource::Explicit(path))));
        }

        match self.find_project_config() {
            Some(path) => {
                let file = settings::load_from_file(&path).await?;
                Ok(Some((file, ConfigSource::Project(path))))
            }
            None => Ok(None),
        }
    }

    /// Load the per-user config file if there is one
    pub async fn load_global_config(&self) -> ConfigResult<Option<(ModstatToml, ConfigSource)>> {
        match Self::global_config_path() {
            Some(path) if path.is_file() => {
                let file = settings::load_from_file(&path).await?;
                Ok(Some((file, ConfigSource::Global(path))))
            }
            _ => Ok(None),
        }
    }

    /// Resolve the full configuration for one run.
    ///
    /// Precedence, highest first: CLI flags, environment, the project or
    /// explicit file, the global file, built-in defaults.
    pub async fn load(
        &self,
        explicit: Option<&Utf8PathBuf>,
        cli: &CliOverrides,
    ) -> ConfigResult<(Config, ConfigSource)> {
        let project = self.load_project_config(explicit).await?;
        let global = self.load_global_config().await?;

        let source = project
            .as_ref()
            .or(global.as_ref())
            .map(|(_, source)| source.clone())
            .unwrap_or(ConfigSource::Defaults);
        debug!("configuration source: {:?}", source);

        let config = ConfigLayering::merge_configs(
            global.map(|(file, _)| file),
            project.map(|(file, _)| file),
            &ConfigLayering::collect_env_overrides(),
            cli,
        )?;
        Ok((config, source))
    }
}

impl ConfigLayering {
    /// Merge every layer into a resolved configuration
    pub fn merge_configs(
        global_config: Option<ModstatToml>,
        project_config: Option<ModstatToml>,
        env_overrides: &HashMap<String, String>,
        cli_overrides: &CliOverrides,
    ) -> ConfigResult<Config> {
        let mut merged = project_config
            .unwrap_or_default()
            .or(global_config.unwrap_or_default());

        Self::apply_env_overrides(&mut merged, env_overrides)?;
        Self::apply_cli_overrides(&mut merged, cli_overrides);

        Config::from_toml(merged)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(
        config: &mut ModstatToml,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                ENV_CACHE_DIR => config.cache_dir = Some(Utf8PathBuf::from(value)),
                ENV_CONCURRENCY => {
                    let concurrency = value.parse::<usize>().map_err(|e| ModstatError::ConfigValidation {
                        field: ENV_CONCURRENCY.to_string(),
                        reason: format!("'{}' is not a worker count: {}", value, e),
                    })?;
                    config.concurrency = Some(concurrency);
                }
                ENV_REGISTRY => config.registry.url = Some(value.clone()),
                ENV_DOWNLOADS_API => config.registry.downloads_url = Some(value.clone()),
                _ => {
                    // Unknown environment variable, ignore
                }
            }
        }

        Ok(())
    }

    /// Apply CLI flag overrides
    fn apply_cli_overrides(config: &mut ModstatToml, overrides: &CliOverrides) {
        if let Some(cache_dir) = &overrides.cache_dir {
            config.cache_dir = Some(cache_dir.clone());
        }
        if let Some(concurrency) = overrides.concurrency {
            config.concurrency = Some(concurrency);
        }
        if let Some(top) = overrides.top {
            config.top = Some(top);
        }
    }

    /// Collect environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with("MODSTAT_"))
            .collect()
    }
}
