//! Configuration loading for modstat
//!
//! This crate parses `modstat.toml` files and layers them with environment
//! variables and command-line flags into one resolved [`Config`].

pub mod merge;
pub mod settings;

// Re-export main types
pub use merge::{CliOverrides, ConfigLayering, ConfigLoader, ConfigSource};
pub use settings::{Config, ModstatToml, RegistrySection, CONFIG_FILE_NAME};

use modstat_core::error::ModstatError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ModstatError>;
