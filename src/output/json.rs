//! JSON output formatter

use super::OutputFormatter;
use crate::diagnostic::Diagnostic;
use crate::engine::AnalysisResult;
use serde::Serialize;

/// JSON formatter for machine-readable output
#[derive(Default)]
pub struct JsonFormatter {
    /// Pretty print with indentation
    pub pretty: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pretty printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn to_string<T: Serialize>(&self, value: &T) -> String {
        let encoded = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        encoded.unwrap_or_else(|e| {
            log::error!("failed to encode JSON output: {}", e);
            String::new()
        })
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    diagnostics: Vec<JsonDiagnostic<'a>>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    rule_id: &'a str,
    severity: String,
    message: &'a str,
    file: String,
    line: usize,
    column: usize,
    end_line: usize,
    end_column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    help: Option<&'a str>,
}

impl<'a> From<&'a Diagnostic> for JsonDiagnostic<'a> {
    fn from(d: &'a Diagnostic) -> Self {
        Self {
            rule_id: &d.rule_id,
            severity: d.severity.to_string(),
            message: &d.message,
            file: d.location.file.display().to_string(),
            line: d.location.line,
            column: d.location.column,
            end_line: d.location.end_line,
            end_column: d.location.end_column,
            help: d.help.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct JsonSummary {
    files_processed: usize,
    files_with_errors: usize,
    files_with_warnings: usize,
    error_count: usize,
    warning_count: usize,
    info_count: usize,
    duration_ms: u128,
    cancelled: bool,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &AnalysisResult) -> String {
        let output = JsonOutput {
            diagnostics: result.diagnostics.iter().map(JsonDiagnostic::from).collect(),
            summary: JsonSummary {
                files_processed: result.files_processed,
                files_with_errors: result.files_with_errors,
                files_with_warnings: result.files_with_warnings,
                error_count: result.error_count,
                warning_count: result.warning_count,
                info_count: result.info_count,
                duration_ms: result.duration.as_millis(),
                cancelled: result.cancelled,
            },
        };

        self.to_string(&output)
    }

    fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        self.to_string(&JsonDiagnostic::from(diagnostic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{Location, Severity};
    use std::path::PathBuf;

    #[test]
    fn test_json_format_diagnostic() {
        let formatter = JsonFormatter::new();
        let diag = Diagnostic::new(
            "S2068",
            Severity::Error,
            "Test message",
            Location::new(PathBuf::from("Db.cs"), 10, 5),
        );

        let output = formatter.format_diagnostic(&diag);
        assert!(output.contains("\"rule_id\":\"S2068\""));
        assert!(output.contains("\"severity\":\"error\""));
        assert!(output.contains("\"line\":10"));
        assert!(!output.contains("help"));
    }

    #[test]
    fn test_json_format_result() {
        let formatter = JsonFormatter::new();
        let result = AnalysisResult {
            files_processed: 5,
            error_count: 2,
            warning_count: 3,
            ..Default::default()
        };

        let value: serde_json::Value = serde_json::from_str(&formatter.format(&result)).unwrap();
        assert_eq!(value["summary"]["files_processed"], 5);
        assert_eq!(value["summary"]["error_count"], 2);
        assert_eq!(value["summary"]["warning_count"], 3);
        assert_eq!(value["summary"]["cancelled"], false);
        assert!(value["diagnostics"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_json_pretty() {
        let formatter = JsonFormatter::new().pretty();
        let diag = Diagnostic::new(
            "S127",
            Severity::Warning,
            "msg",
            Location::new(PathBuf::from("Loop.cs"), 1, 1),
        );

        let output = formatter.format_diagnostic(&diag);
        assert!(output.contains('\n'));
    }
}
