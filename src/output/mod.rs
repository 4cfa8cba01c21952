//! Output formatters for analysis results

mod json;
mod sarif;
mod text;

pub use json::JsonFormatter;
pub use sarif::SarifFormatter;
pub use text::TextFormatter;

use crate::diagnostic::Diagnostic;
use crate::engine::AnalysisResult;

/// Output formatter trait
pub trait OutputFormatter: Send + Sync {
    /// Format the entire analysis result
    fn format(&self, result: &AnalysisResult) -> String;

    /// Format a single diagnostic
    fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String;
}
