//! Error types and result aliases for modstat operations.
//!
//! Provides a unified error type covering retrieval, decoding, archive
//! extraction, caching and configuration failures, with enough context to
//! decide whether an operation is worth retrying.

use thiserror::Error;

/// Unified error type for all modstat operations
#[derive(Error, Debug)]
pub enum ModstatError {
    // Retrieval errors
    #[error("Request failed with status code {status}. URL: {url}")]
    Retrieval { url: String, status: u16 },

    #[error("Failed to decode JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Archive errors
    #[error("Could not find {entry} in archive")]
    EntryNotFound { entry: String },

    #[error("Archive extraction failed: {message}")]
    Extraction {
        message: String,
        #[source]
        source: std::io::Error,
    },

    // Data integrity errors
    #[error("Version {version} of '{package}' has download stats but no registry metadata")]
    MissingVersion { package: String, version: String },

    // Cache errors
    #[error("Invalid cache key '{key}'")]
    InvalidCacheKey { key: String },

    // Config errors
    #[error("Failed to parse {path}: {message}")]
    ConfigParse { path: String, message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // Scheduling errors
    #[error("Worker task failed: {message}")]
    Worker { message: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for modstat operations
pub type ModstatResult<T> = Result<T, ModstatError>;

impl ModstatError {
    /// Create a network error from any error type
    pub fn network<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Create an extraction error from std::io::Error
    pub fn extraction(message: String, source: std::io::Error) -> Self {
        Self::Extraction { message, source }
    }

    /// Check if this error is recoverable by retrying the operation
    pub fn is_recoverable(&self) -> bool {
        match self {
            ModstatError::Network { .. } | ModstatError::Io { .. } => true,
            // Truncated or reset transfers surface while the archive is read.
            ModstatError::Extraction { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::TimedOut
            ),
            ModstatError::Retrieval { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ModstatError::Retrieval { status: 404, .. } => {
                Some("Check the package or author name spelling")
            },
            ModstatError::Retrieval { status: 429, .. } => {
                Some("The registry is rate limiting requests; lower --concurrency and re-run")
            },
            ModstatError::Network { .. } => Some("Check your internet connection and try again"),
            ModstatError::Decode { .. } => {
                Some("Delete the offending cache file if it is corrupt, then re-run")
            },
            ModstatError::MissingVersion { .. } => {
                Some("Run 'modstat clean' to refresh cached registry metadata")
            },
            ModstatError::ConfigParse { .. } | ModstatError::ConfigValidation { .. } => {
                Some("Fix the configuration file or override the value with a CLI flag")
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_message_carries_status_and_url() {
        let err = ModstatError::Retrieval {
            url: "https://registry.npmjs.org/nope".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "Request failed with status code 404. URL: https://registry.npmjs.org/nope"
        );
    }

    #[test]
    fn test_recoverable_classification() {
        let server_error = ModstatError::Retrieval { url: "u".to_string(), status: 503 };
        let rate_limited = ModstatError::Retrieval { url: "u".to_string(), status: 429 };
        let not_found = ModstatError::Retrieval { url: "u".to_string(), status: 404 };
        assert!(server_error.is_recoverable());
        assert!(rate_limited.is_recoverable());
        assert!(!not_found.is_recoverable());

        let missing = ModstatError::EntryNotFound { entry: "package/package.json".to_string() };
        assert!(!missing.is_recoverable());

        let join = ModstatError::MissingVersion {
            package: "a".to_string(),
            version: "1.0.0".to_string(),
        };
        assert!(!join.is_recoverable());

        let network = ModstatError::Network { message: "reset".to_string(), source: None };
        assert!(network.is_recoverable());
    }

    #[test]
    fn test_corrupt_archive_is_not_retried() {
        let corrupt = ModstatError::extraction(
            "bad gzip".to_string(),
            std::io::Error::new(std::io::ErrorKind::InvalidData, "invalid gzip header"),
        );
        assert!(!corrupt.is_recoverable());

        let truncated = ModstatError::extraction(
            "short read".to_string(),
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"),
        );
        assert!(truncated.is_recoverable());
    }

    #[test]
    fn test_suggestions() {
        let not_found = ModstatError::Retrieval { url: "u".to_string(), status: 404 };
        assert!(not_found.suggestion().is_some());

        let worker = ModstatError::Worker { message: "panicked".to_string() };
        assert!(worker.suggestion().is_none());
    }
}
