//! Error message formatting with actionable suggestions.

use std::error::Error;

use modstat_core::error::ModstatError;
use modstat_core::PackageFailure;

use super::colors::ColorSupport;

/// Error formatter with suggestions
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    /// Create a new error formatter
    pub fn new() -> Self {
        Self::with_colors(ColorSupport::detect())
    }

    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    /// Format a fatal error with its source chain and a suggestion
    pub fn format_error(&self, error: &ModstatError) -> String {
        let mut output = format!("{}: {}", self.colors.red("error"), error);

        // Messages that already embed their source would repeat it
        let rendered = error.to_string();
        let mut source = error.source();
        while let Some(err) = source {
            let cause = err.to_string();
            if !rendered.contains(&cause) {
                output.push_str(&format!("\n  {}: {}", self.colors.dim("caused by"), cause));
            }
            source = err.source();
        }

        if let Some(suggestion) = error.suggestion() {
            output.push_str(&format!("\n\n{}: {}", self.colors.dim("help"), suggestion));
        }

        output
    }

    /// One line for a package that failed during a run
    pub fn format_failure(&self, failure: &PackageFailure) -> String {
        format!("{}: {}", self.colors.bold(&failure.package_name), failure.error)
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}
