//! Rendering of author summaries

use modstat_core::{PackageSummary, Summary};
use serde::Serialize;

use super::colors::ColorSupport;

/// Summary as printed by default: totals only, percentage to two decimals
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView<'a> {
    pub author_name: &'a str,
    pub total_packages: usize,
    pub total_versions: usize,
    pub total_downloads: u64,
    pub total_esm: u64,
    pub total_cjs: u64,
    pub percent_esm: String,
}

pub fn summary_view(summary: &Summary) -> SummaryView<'_> {
    SummaryView {
        author_name: &summary.author_name,
        total_packages: summary.total_packages,
        total_versions: summary.total_versions,
        total_downloads: summary.total_downloads,
        total_esm: summary.total_esm,
        total_cjs: summary.total_cjs,
        percent_esm: format!("{:.2}", summary.percent_esm),
    }
}

/// Both rankings as aligned text tables
pub fn render_rankings(summary: &Summary, colors: &ColorSupport) -> String {
    let mut output = String::new();
    output.push_str(&render_ranking("Top ESM", &summary.top_esm, |p| p.esm, colors));
    output.push('\n');
    output.push_str(&render_ranking("Top CommonJS", &summary.top_cjs, |p| p.cjs, colors));
    output
}

fn render_ranking(
    title: &str,
    packages: &[PackageSummary],
    value: impl Fn(&PackageSummary) -> u64,
    colors: &ColorSupport,
) -> String {
    let mut output = format!("{}\n", colors.bold(title));
    if packages.is_empty() {
        output.push_str(&format!("  {}\n", colors.dim("(none)")));
        return output;
    }

    let width = packages.iter().map(|p| p.package_name.len()).max().unwrap_or(0);
    for (rank, package) in packages.iter().enumerate() {
        output.push_str(&format!(
            "{:>4}. {:<width$}  {:>12} / {:>12}\n",
            rank + 1,
            package.package_name,
            value(package),
            package.downloads,
            width = width
        ));
    }
    output
}
