//! SARIF (Static Analysis Results Interchange Format) output formatter
//!
//! SARIF is a standard format for static analysis tools, supported by
//! GitHub code scanning, Azure DevOps, and other CI/CD systems.

use super::OutputFormatter;
use crate::diagnostic::{Diagnostic, Location, Severity};
use crate::engine::AnalysisResult;
use crate::rule::RuleDescriptor;
use serde::Serialize;

const SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

/// SARIF formatter for CI/CD integration
#[derive(Default)]
pub struct SarifFormatter {
    /// Tool name
    pub tool_name: String,

    /// Tool version
    pub tool_version: String,

    /// Descriptors published as the driver's rule metadata
    pub rules: Vec<&'static RuleDescriptor>,
}

impl SarifFormatter {
    /// Create a new SARIF formatter
    pub fn new(tool_name: &str, tool_version: &str) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            tool_version: tool_version.to_string(),
            rules: Vec::new(),
        }
    }

    /// Publish rule metadata from descriptors
    pub fn with_rules(mut self, rules: Vec<&'static RuleDescriptor>) -> Self {
        self.rules = rules;
        self
    }

    fn rule_index(&self, rule_id: &str) -> Option<usize> {
        self.rules.iter().position(|d| d.id == rule_id)
    }

    fn result(&self, d: &Diagnostic) -> SarifResult {
        SarifResult {
            rule_id: d.rule_id.clone(),
            rule_index: self.rule_index(&d.rule_id),
            level: severity_to_level(d.severity),
            message: SarifMessage {
                text: d.message.clone(),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifactLocation {
                        uri: d.location.file.display().to_string().replace('\\', "/"),
                    },
                    region: SarifRegion::from(&d.location),
                },
            }],
        }
    }
}

#[derive(Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDriver {
    name: String,
    version: String,
    information_uri: &'static str,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: &'static str,
    name: &'static str,
    short_description: SarifMessage,
    full_description: SarifMessage,
    default_configuration: SarifConfiguration,
    properties: SarifRuleProperties,
}

#[derive(Serialize)]
struct SarifRuleProperties {
    category: String,
}

#[derive(Serialize)]
struct SarifConfiguration {
    level: &'static str,
    enabled: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rule_index: Option<usize>,
    level: &'static str,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
    region: SarifRegion,
}

#[derive(Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRegion {
    start_line: usize,
    start_column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_column: Option<usize>,
}

impl From<&Location> for SarifRegion {
    fn from(location: &Location) -> Self {
        // SARIF positions are 1-based; an empty region is just a point
        let has_extent = (location.end_line, location.end_column) > (location.line, location.column);
        Self {
            start_line: location.line.max(1),
            start_column: location.column.max(1),
            end_line: has_extent.then_some(location.end_line),
            end_column: has_extent.then_some(location.end_column),
        }
    }
}

fn severity_to_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

impl From<&'static RuleDescriptor> for SarifRule {
    fn from(d: &'static RuleDescriptor) -> Self {
        Self {
            id: d.id,
            name: d.title,
            short_description: SarifMessage {
                text: d.title.to_string(),
            },
            full_description: SarifMessage {
                text: d.description.to_string(),
            },
            default_configuration: SarifConfiguration {
                level: severity_to_level(d.severity),
                enabled: d.enabled_by_default,
            },
            properties: SarifRuleProperties {
                category: d.category.to_string(),
            },
        }
    }
}

impl OutputFormatter for SarifFormatter {
    fn format(&self, result: &AnalysisResult) -> String {
        let report = SarifReport {
            schema: SCHEMA,
            version: "2.1.0",
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: self.tool_name.clone(),
                        version: self.tool_version.clone(),
                        information_uri: env!("CARGO_PKG_REPOSITORY"),
                        rules: self.rules.iter().copied().map(SarifRule::from).collect(),
                    },
                },
                results: result.diagnostics.iter().map(|d| self.result(d)).collect(),
            }],
        };

        serde_json::to_string_pretty(&report).unwrap_or_default()
    }

    fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        serde_json::to_string_pretty(&self.result(diagnostic)).unwrap_or_default()
    }
}
