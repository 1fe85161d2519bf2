//! Terminal output formatting and utilities.
//!
//! Status lines go through [`OutputHandler`]; reports are rendered in
//! [`report`] and printed to stdout by the commands.

pub mod colors;
pub mod errors;
pub mod report;

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    pub(crate) colors: colors::ColorSupport,
    pub(crate) errors: errors::ErrorFormatter,
}

impl OutputHandler {
    /// Create a new output handler
    pub fn new() -> Self {
        Self {
            colors: colors::ColorSupport::detect(),
            errors: errors::ErrorFormatter::new(),
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        eprintln!("{}", self.colors.dim(message));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", self.colors.green("✓"), message);
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", self.colors.yellow("⚠"), message);
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.colors.red("✗"), message);
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
