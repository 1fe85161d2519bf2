//! Whole-author runs
//!
//! Looks up an author's packages, analyzes them under the bounded scheduler
//! and folds the results into a [`RunReport`]. A package that fails is
//! recorded and skipped; the rest of the run carries on.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use modstat_cache::CacheDomain;
use modstat_core::{PackageFailure, PackageSummary, RunReport};
use tracing::{info, warn};

use crate::aggregate::{aggregate, DEFAULT_TOP_N};
use crate::scheduler::{run_bounded, DEFAULT_CONCURRENCY};
use crate::versions::VersionAnalyzer;
use crate::AnalyzerResult;

/// Runs the analysis for every package of an author
#[derive(Debug, Clone)]
pub struct Summarizer {
    analyzer: Arc<VersionAnalyzer>,
    concurrency: usize,
    top_n: isize,
}

impl Summarizer {
    /// Create a summarizer with default concurrency and ranking size
    pub fn new(analyzer: VersionAnalyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            concurrency: DEFAULT_CONCURRENCY,
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Set the number of packages analyzed at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the size of the ESM/CommonJS rankings
    pub fn with_top_n(mut self, top_n: isize) -> Self {
        self.top_n = top_n;
        self
    }

    /// The analyzer packages are dispatched to
    pub fn analyzer(&self) -> &VersionAnalyzer {
        &self.analyzer
    }

    /// Every package name published by `author`, cached indefinitely
    pub async fn get_packages(&self, author: &str) -> AnalyzerResult<Vec<String>> {
        self.analyzer
            .store()
            .get_or_compute(&CacheDomain::PackagesByAuthor.key(author), || {
                self.analyzer.client().author_packages(author)
            })
            .await
    }

    /// Analyze every package of `author`
    pub async fn summarize(&self, author: &str) -> AnalyzerResult<RunReport> {
        let packages = self.get_packages(author).await?;
        info!("analyzing {} packages by {}", packages.len(), author);
        self.summarize_packages(author, packages).await
    }

    /// Analyze an explicit list of packages and report them under `author`
    pub async fn summarize_packages(
        &self,
        author: &str,
        packages: Vec<String>,
    ) -> AnalyzerResult<RunReport> {
        let total = packages.len();
        let processed = Arc::new(AtomicUsize::new(0));
        let analyzer = Arc::clone(&self.analyzer);

        let outcomes = {
            let processed = Arc::clone(&processed);
            run_bounded(self.concurrency, packages, move |package_name: String| {
                let analyzer = Arc::clone(&analyzer);
                let processed = Arc::clone(&processed);
                async move {
                    let outcome = analyzer.analyze_package(&package_name).await;
                    let count = processed.fetch_add(1, Ordering::SeqCst) + 1;
                    match &outcome {
                        Ok(_) => info!("{} ({}/{})", package_name, count, total),
                        Err(e) => warn!("{} ({}/{}) failed: {}", package_name, count, total, e),
                    }
                    (package_name, outcome)
                }
            })
            .await?
        };

        let mut summaries: Vec<PackageSummary> = Vec::new();
        let mut failures = Vec::new();
        for (package_name, outcome) in outcomes {
            match outcome {
                Ok(summary) => summaries.push(summary),
                Err(error) => failures.push(PackageFailure {
                    package_name,
                    error: error.to_string(),
                }),
            }
        }

        // Completion order is arbitrary; report in name order.
        summaries.sort_by(|a, b| a.package_name.cmp(&b.package_name));
        failures.sort_by(|a, b| a.package_name.cmp(&b.package_name));

        Ok(RunReport {
            summary: aggregate(author, summaries, self.top_n),
            processed: processed.load(Ordering::SeqCst),
            failures,
        })
    }
}

#[cfg(test)]
mod tests;
