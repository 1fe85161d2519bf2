//! Package manifest types.
//!
//! Only the fields the analysis consumes are decoded; everything else in a
//! tarball's package.json is ignored and never persisted.

use serde::{Deserialize, Deserializer, Serialize};

/// Value of the `type` field that marks a package as an ES module
pub const ESM_MODULE_TYPE: &str = "module";

/// The subset of a published package.json read from a version's tarball
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageFile {
    /// Module type ("module" or "commonjs"), absent for most CommonJS packages
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub module_type: Option<String>,
}

/// Hand-edited manifests occasionally carry a non-string `type`; treat it as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

impl PackageFile {
    /// Create a manifest with the given module type
    pub fn with_type(module_type: impl Into<String>) -> Self {
        Self {
            module_type: Some(module_type.into()),
        }
    }

    /// Whether this manifest declares the package as an ES module
    pub fn is_esm(&self) -> bool {
        self.module_type.as_deref() == Some(ESM_MODULE_TYPE)
    }
}
