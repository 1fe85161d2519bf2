//! Path utilities for safe file system operations.
//!
//! Cache keys are turned into paths under a root directory; these checks keep
//! a key from escaping that root.

use crate::error::{ModstatError, ModstatResult};
use std::path::{Component, Path, PathBuf};

/// Check if a path is safe: relative, with only normal components
pub fn is_safe_path(path: &Path) -> bool {
    if path.as_os_str().is_empty() || path.is_absolute() {
        return false;
    }

    path.components()
        .all(|component| matches!(component, Component::Normal(_)))
}

/// Safely join a cache key onto a root, rejecting traversal
pub fn safe_join(base: &Path, key: &str) -> ModstatResult<PathBuf> {
    let path = Path::new(key);
    // `a//b` and trailing slashes are normalised away by components(), reject them explicitly.
    if key.split('/').any(str::is_empty) || !is_safe_path(path) {
        return Err(ModstatError::InvalidCacheKey {
            key: key.to_string(),
        });
    }

    Ok(base.join(path))
}
