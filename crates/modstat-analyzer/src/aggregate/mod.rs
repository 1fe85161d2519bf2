//! Author-level totals and rankings

use modstat_core::{PackageSummary, Summary};

/// Size of the ESM and CommonJS rankings in a summary
pub const DEFAULT_TOP_N: isize = 10;

/// Numeric field of a package summary to rank by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryField {
    Downloads,
    Esm,
    Cjs,
}

impl SummaryField {
    fn value(self, summary: &PackageSummary) -> u64 {
        match self {
            SummaryField::Downloads => summary.downloads,
            SummaryField::Esm => summary.esm,
            SummaryField::Cjs => summary.cjs,
        }
    }
}

/// Rank summaries by `field`, largest first.
///
/// The sort is stable, so ties keep their input order. A negative `count`
/// reverses the ranked list and takes the first `|count|`, i.e. the smallest
/// values with ties in reverse input order.
pub fn top_by(values: &[PackageSummary], field: SummaryField, count: isize) -> Vec<PackageSummary> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| field.value(b).cmp(&field.value(a)));

    if count < 0 {
        sorted.reverse();
        sorted.truncate(count.unsigned_abs());
    } else {
        sorted.truncate(count as usize);
    }
    sorted
}

/// Fold package summaries into author totals.
///
/// Packages without downloads are dropped. `percent_esm` is NaN when nothing
/// was downloaded at all.
pub fn aggregate<I>(author_name: &str, summaries: I, top_n: isize) -> Summary
where
    I: IntoIterator<Item = PackageSummary>,
{
    let packages: Vec<PackageSummary> = summaries
        .into_iter()
        .filter(|summary| summary.downloads > 0)
        .collect();

    let total_versions = packages.iter().map(|p| p.num_versions).sum();
    let total_downloads: u64 = packages.iter().map(|p| p.downloads).sum();
    let total_esm: u64 = packages.iter().map(|p| p.esm).sum();
    let total_cjs: u64 = packages.iter().map(|p| p.cjs).sum();

    Summary {
        author_name: author_name.to_string(),
        total_packages: packages.len(),
        total_versions,
        total_downloads,
        total_esm,
        total_cjs,
        percent_esm: total_esm as f64 / total_downloads as f64 * 100.0,
        top_esm: top_by(&packages, SummaryField::Esm, top_n),
        top_cjs: top_by(&packages, SummaryField::Cjs, top_n),
        packages,
    }
}
