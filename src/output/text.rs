//! Human-readable text output formatter

use super::OutputFormatter;
use crate::diagnostic::{Diagnostic, Severity};
use crate::engine::AnalysisResult;
use colored::*;
use std::collections::BTreeMap;
use std::path::Path;

/// Text formatter with optional color support
pub struct TextFormatter {
    /// Enable colored output
    pub colored: bool,

    /// Show help text
    pub show_help: bool,

    /// Show statistics
    pub show_stats: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            colored: true,
            show_help: true,
            show_stats: true,
        }
    }
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", count, if count == 1 { singular } else { plural })
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable colors
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    /// Omit the summary footer
    pub fn without_stats(mut self) -> Self {
        self.show_stats = false;
        self
    }

    fn severity_str(&self, severity: Severity) -> ColoredString {
        let s = format!("{}", severity);
        if !self.colored {
            return s.normal();
        }
        match severity {
            Severity::Error => s.red().bold(),
            Severity::Warning => s.yellow().bold(),
            Severity::Info => s.blue(),
        }
    }

    fn paint(&self, text: String, paint: fn(&str) -> ColoredString) -> String {
        if self.colored {
            paint(&text).to_string()
        } else {
            text
        }
    }

    fn format_location(&self, diag: &Diagnostic) -> String {
        format!(
            "{}:{}:{}",
            diag.location.file.display(),
            diag.location.line,
            diag.location.column
        )
    }

    fn format_summary(&self, result: &AnalysisResult) -> String {
        let mut output = format!(
            "\n{} processed",
            plural(result.files_processed, "file", "files")
        );

        let mut counts = Vec::new();
        if result.error_count > 0 {
            counts.push(self.paint(plural(result.error_count, "error", "errors"), |s| s.red()));
        }
        if result.warning_count > 0 {
            counts.push(self.paint(
                plural(result.warning_count, "warning", "warnings"),
                |s| s.yellow(),
            ));
        }
        if result.info_count > 0 {
            counts.push(self.paint(plural(result.info_count, "info", "infos"), |s| s.blue()));
        }

        if !counts.is_empty() {
            output.push_str(&format!(": {}", counts.join(", ")));
        }
        output.push('\n');

        if result.cancelled {
            output.push_str(&self.paint("Analysis was cancelled\n".to_string(), |s| s.yellow()));
        }
        output.push_str(&format!(
            "Finished in {:.2}s\n",
            result.duration.as_secs_f64()
        ));
        output
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &AnalysisResult) -> String {
        let mut output = String::new();

        // Group diagnostics by file, in path order
        let mut by_file: BTreeMap<&Path, Vec<&Diagnostic>> = BTreeMap::new();
        for diag in &result.diagnostics {
            by_file
                .entry(diag.location.file.as_path())
                .or_default()
                .push(diag);
        }

        for (file, diagnostics) in &by_file {
            output.push_str(&self.paint(file.display().to_string(), |s| s.underline()));
            output.push('\n');

            for diag in diagnostics {
                output.push_str(&self.format_diagnostic(diag));
            }
            output.push('\n');
        }

        if self.show_stats {
            output.push_str(&self.format_summary(result));
        }

        output
    }

    fn format_diagnostic(&self, diag: &Diagnostic) -> String {
        let mut output = format!(
            "{}: {}[{}]: {}\n",
            self.format_location(diag),
            self.severity_str(diag.severity),
            self.paint(diag.rule_id.clone(), |s| s.cyan()),
            diag.message
        );

        if self.show_help {
            if let Some(help) = &diag.help {
                output.push_str(&format!(
                    "   {} help: {}\n",
                    self.paint("=".to_string(), |s| s.blue()),
                    help
                ));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Location;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn diagnostic(file: &str, rule_id: &str, severity: Severity) -> Diagnostic {
        Diagnostic::new(
            rule_id,
            severity,
            "Test message",
            Location::new(PathBuf::from(file), 10, 5),
        )
    }

    #[test]
    fn test_format_diagnostic() {
        let formatter = TextFormatter::new().without_color();
        let diag = diagnostic("Service.cs", "S1186", Severity::Warning)
            .with_help("Methods should not be empty");

        assert_eq!(
            formatter.format_diagnostic(&diag),
            "Service.cs:10:5: warning[S1186]: Test message\n   = help: Methods should not be empty\n"
        );
    }

    #[test]
    fn test_format_result_groups_by_file() {
        let formatter = TextFormatter::new().without_color();
        let result = AnalysisResult {
            diagnostics: vec![
                diagnostic("b.cs", "S127", Severity::Warning),
                diagnostic("a.cs", "S6354", Severity::Info),
                diagnostic("b.cs", "S2068", Severity::Error),
            ],
            files_processed: 2,
            error_count: 1,
            warning_count: 1,
            info_count: 1,
            ..Default::default()
        };

        let output = formatter.format(&result);
        let a = output.find("a.cs\n").unwrap();
        let b = output.find("b.cs\n").unwrap();
        assert!(a < b);
        assert!(output.contains("2 files processed: 1 error, 1 warning, 1 info"));
    }

    #[test]
    fn test_summary_mentions_cancellation() {
        let formatter = TextFormatter::new().without_color();
        let result = AnalysisResult {
            files_processed: 1,
            cancelled: true,
            ..Default::default()
        };

        let output = formatter.format(&result);
        assert!(output.contains("1 file processed\n"));
        assert!(output.contains("Analysis was cancelled"));
        assert!(!TextFormatter::new()
            .without_color()
            .without_stats()
            .format(&result)
            .contains("processed"));
    }
}
