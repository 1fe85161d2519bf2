//! Module format analysis engine for modstat
//!
//! This crate classifies every downloaded version of a package as ESM or
//! CommonJS, fans that work out across an author's packages with a fixed
//! number of workers, and folds the results into download-weighted totals.

pub mod aggregate;
pub mod scheduler;
pub mod summarize;
pub mod versions;

// Re-export main types
pub use aggregate::{aggregate, top_by, SummaryField, DEFAULT_TOP_N};
pub use scheduler::{run_bounded, DEFAULT_CONCURRENCY};
pub use summarize::Summarizer;
pub use versions::VersionAnalyzer;

use modstat_core::error::ModstatError;

/// Result type for analyzer operations
pub type AnalyzerResult<T> = Result<T, ModstatError>;

#[cfg(test)]
pub(crate) mod test_fixtures;
