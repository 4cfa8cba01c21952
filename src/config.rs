//! Configuration system for the analysis engine
//!
//! Reads configuration from:
//! - `.netlintrc.yaml` / `.netlintrc.json` (project-level)
//! - `~/.netlintrc.yaml` (user-level)
//!
//! Rule parameters are validated into a [`RuleSettings`] value when a file is
//! loaded, so a bad `maxGenericParametersInClass` fails before any analysis.

use crate::diagnostic::Severity;
use crate::rules::credentials::{CredentialWordSet, CredentialWords};
use crate::rules::generic_parameters::{DEFAULT_MAX_IN_CLASS, DEFAULT_MAX_IN_METHOD};
use crate::rules::{all_descriptors, find_descriptor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub const CREDENTIAL_WORDS_KEY: &str = "credentialWords";
pub const MAX_IN_CLASS_KEY: &str = "maxGenericParametersInClass";
pub const MAX_IN_METHOD_KEY: &str = "maxGenericParametersInMethod";

/// Short parameter names accepted for the generic-parameter limits
const MAX_IN_CLASS_ALIAS: &str = "max";
const MAX_IN_METHOD_ALIAS: &str = "maxMethod";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid value '{value}' for parameter '{key}': expected {expected}")]
    InvalidParameter {
        key: String,
        value: String,
        expected: String,
    },

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Enable parallel processing
    pub parallel: bool,

    /// Number of parallel jobs (0 = auto-detect)
    pub jobs: usize,

    /// Also analyze units the host marked as generated
    pub analyze_generated: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            jobs: 0,
            analyze_generated: false,
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormat,

    /// Color mode
    pub color: ColorMode,

    /// Verbose output
    pub verbose: bool,

    /// Show statistics
    pub statistics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: ColorMode::Auto,
            verbose: false,
            statistics: true,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Sarif,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Color mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// File handling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Include patterns
    pub include: Vec<String>,

    /// Exclude patterns
    pub exclude: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            include: vec!["**/*.cs.json".to_string(), "**/*.vb.json".to_string()],
            exclude: vec!["**/obj/**".to_string(), "**/bin/**".to_string()],
        }
    }
}

/// Rule configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Disabled rules
    pub disabled: Vec<String>,

    /// Rules turned on in addition to the enabled-by-default set
    pub enabled: Vec<String>,

    /// Run only these rules (empty = no restriction)
    pub only: Vec<String>,

    /// Severity overrides (rule_id -> severity)
    pub severity: HashMap<String, Severity>,

    /// Per-file rule ignores (glob pattern -> rule IDs)
    pub per_file: HashMap<String, Vec<String>>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extend from other configuration files or presets
    pub extends: Vec<String>,

    /// Engine settings
    pub engine: EngineConfig,

    /// Output settings
    pub output: OutputConfig,

    /// File handling settings
    pub files: FilesConfig,

    /// Rule configuration
    pub rules: RulesConfig,

    /// Rule parameters (key -> scalar)
    pub parameters: HashMap<String, serde_yaml::Value>,
}

fn contains_id(ids: &[String], rule_id: &str) -> bool {
    ids.iter().any(|id| id.eq_ignore_ascii_case(rule_id))
}

impl Config {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a preset configuration by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "recommended" => Some(Self::default()),
            "all" => Some(Self::preset_all()),
            _ => None,
        }
    }

    /// Every rule, including the ones disabled by default
    fn preset_all() -> Self {
        let mut config = Self::default();
        config.rules.enabled = all_descriptors()
            .iter()
            .map(|d| d.id.to_string())
            .collect();
        config
    }

    /// Load configuration from a file and validate its parameters
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load_with_depth(path, 0)?;
        RuleSettings::from_config(&config)?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load with recursion depth limit (to prevent infinite loops)
    fn load_with_depth(path: &Path, depth: usize) -> Result<Self, ConfigError> {
        const MAX_DEPTH: usize = 10;
        if depth >= MAX_DEPTH {
            return Err(ConfigError::Invalid(
                "Maximum config inheritance depth exceeded".to_string(),
            ));
        }

        let content = std::fs::read_to_string(path)?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let mut config: Self = match ext {
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown config file format: {}",
                    ext
                )))
            }
        };

        if !config.extends.is_empty() {
            let base_dir = path.parent().unwrap_or(Path::new("."));
            let mut base_config = Self::default();

            for extend in &config.extends.clone() {
                let extended = if let Some(preset) = Self::preset(extend) {
                    preset
                } else if Path::new(extend).extension().is_none() {
                    return Err(ConfigError::UnknownPreset(extend.clone()));
                } else {
                    let extend_path = if Path::new(extend).is_absolute() {
                        PathBuf::from(extend)
                    } else {
                        base_dir.join(extend)
                    };
                    Self::load_with_depth(&extend_path, depth + 1)?
                };
                base_config.merge(extended);
            }

            // Merge current config on top of base
            base_config.merge(config);
            config = base_config;
        }

        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Self) {
        if other.engine.jobs != 0 {
            self.engine.jobs = other.engine.jobs;
        }
        self.engine.parallel = other.engine.parallel;
        if other.engine.analyze_generated {
            self.engine.analyze_generated = true;
        }

        if other.output.format != OutputFormat::Text {
            self.output.format = other.output.format;
        }
        if other.output.verbose {
            self.output.verbose = true;
        }
        if other.output.color != ColorMode::Auto {
            self.output.color = other.output.color;
        }
        self.output.statistics = other.output.statistics;

        // Files - extend lists
        for pattern in other.files.include {
            if !self.files.include.contains(&pattern) {
                self.files.include.push(pattern);
            }
        }
        for pattern in other.files.exclude {
            if !self.files.exclude.contains(&pattern) {
                self.files.exclude.push(pattern);
            }
        }

        self.rules.disabled.extend(other.rules.disabled);
        self.rules.enabled.extend(other.rules.enabled);
        if !other.rules.only.is_empty() {
            self.rules.only = other.rules.only;
        }
        self.rules.severity.extend(other.rules.severity);
        for (pattern, rules) in other.rules.per_file {
            self.rules.per_file.entry(pattern).or_default().extend(rules);
        }

        self.parameters.extend(other.parameters);
    }

    /// Load configuration from default locations
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_names = [
            ".netlintrc.yaml",
            ".netlintrc.yml",
            ".netlintrc.json",
            "netlint.yaml",
            "netlint.json",
        ];

        // Check current directory
        for name in &config_names {
            let path = PathBuf::from(name);
            if path.exists() {
                return Self::load(&path);
            }
        }

        // Check home directory
        if let Some(home) = dirs::home_dir() {
            for name in &config_names {
                let path = home.join(name);
                if path.exists() {
                    return Self::load(&path);
                }
            }
        }

        log::debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Merge CLI arguments into configuration
    pub fn merge_cli(
        &mut self,
        format: Option<OutputFormat>,
        verbose: Option<bool>,
        jobs: Option<usize>,
        disabled_rules: Option<Vec<String>>,
        enabled_rules: Option<Vec<String>>,
        only_rules: Option<Vec<String>>,
    ) {
        if let Some(f) = format {
            self.output.format = f;
        }
        if let Some(v) = verbose {
            self.output.verbose = v;
        }
        if let Some(j) = jobs {
            self.engine.jobs = j;
        }
        if let Some(disabled) = disabled_rules {
            self.rules.disabled.extend(disabled);
        }
        if let Some(enabled) = enabled_rules {
            self.rules.enabled.extend(enabled);
        }
        if let Some(only) = only_rules {
            self.rules.only = only;
        }
    }

    /// Check if a rule is enabled
    ///
    /// `disabled` wins over everything; a non-empty `only` list restricts
    /// the run to its rules; otherwise `enabled` adds to the rules that are
    /// on by default. Unknown ids count as enabled by default.
    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        if contains_id(&self.rules.disabled, rule_id) {
            return false;
        }

        if !self.rules.only.is_empty() {
            return contains_id(&self.rules.only, rule_id);
        }

        if contains_id(&self.rules.enabled, rule_id) {
            return true;
        }

        find_descriptor(rule_id).is_none_or(|d| d.enabled_by_default)
    }

    /// Get severity override for a rule
    pub fn get_severity_override(&self, rule_id: &str) -> Option<Severity> {
        self.rules.severity.get(rule_id).copied()
    }

    /// Check if a rule should be ignored for a file
    pub fn should_ignore_rule_for_file(&self, rule_id: &str, file_path: &Path) -> bool {
        let file_str = file_path.to_string_lossy();

        for (pattern, rules) in &self.rules.per_file {
            if let Ok(glob) = globset::Glob::new(pattern) {
                let matcher = glob.compile_matcher();
                if matcher.is_match(file_str.as_ref())
                    && (rules.iter().any(|r| r == "all") || contains_id(rules, rule_id))
                {
                    return true;
                }
            }
        }

        false
    }
}

/// Validated rule parameters shared by every rule instance of an engine
#[derive(Debug, Clone)]
pub struct RuleSettings {
    pub credential_words: Arc<CredentialWords>,
    pub max_generic_parameters_in_class: usize,
    pub max_generic_parameters_in_method: usize,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            credential_words: Arc::new(CredentialWords::default()),
            max_generic_parameters_in_class: DEFAULT_MAX_IN_CLASS,
            max_generic_parameters_in_method: DEFAULT_MAX_IN_METHOD,
        }
    }
}

fn display_value(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn parse_integer(key: &str, value: &serde_yaml::Value) -> Result<usize, ConfigError> {
    let parsed = match value {
        serde_yaml::Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        serde_yaml::Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ConfigError::InvalidParameter {
        key: key.to_string(),
        value: display_value(value),
        expected: "a non-negative integer".to_string(),
    })
}

fn parse_word_list(key: &str, value: &serde_yaml::Value) -> Result<String, ConfigError> {
    match value {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .map(|item| match item {
                serde_yaml::Value::String(s) => Ok(s.clone()),
                other => Err(ConfigError::InvalidParameter {
                    key: key.to_string(),
                    value: display_value(other),
                    expected: "a word".to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|words| words.join(",")),
        other => Err(ConfigError::InvalidParameter {
            key: key.to_string(),
            value: display_value(other),
            expected: "a comma separated list of words".to_string(),
        }),
    }
}

impl RuleSettings {
    /// Validate the `parameters` section of a configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        let mut credential_words = None;

        for (key, value) in &config.parameters {
            match key.as_str() {
                CREDENTIAL_WORDS_KEY => {
                    let list = parse_word_list(key, value)?;
                    credential_words = Some(CredentialWordSet::parse(&list)?);
                }
                MAX_IN_CLASS_KEY | MAX_IN_CLASS_ALIAS => {
                    settings.max_generic_parameters_in_class = parse_integer(key, value)?;
                }
                MAX_IN_METHOD_KEY | MAX_IN_METHOD_ALIAS => {
                    settings.max_generic_parameters_in_method = parse_integer(key, value)?;
                }
                _ => log::warn!("ignoring unknown rule parameter '{}'", key),
            }
        }

        if let Some(words) = credential_words {
            settings.credential_words = Arc::new(CredentialWords::new(words));
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert!(config.engine.parallel);
        assert_eq!(config.engine.jobs, 0);
        assert!(!config.engine.analyze_generated);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.files.include, vec!["**/*.cs.json", "**/*.vb.json"]);
        assert!(config.parameters.is_empty());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("sarif".parse::<OutputFormat>().unwrap(), OutputFormat::Sarif);
        assert!("junit".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_config_merge_cli() {
        let mut config = Config::new();
        config.merge_cli(
            Some(OutputFormat::Json),
            Some(true),
            Some(4),
            Some(vec!["S127".to_string()]),
            Some(vec!["S2436".to_string()]),
            None,
        );

        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.verbose);
        assert_eq!(config.engine.jobs, 4);
        assert!(!config.is_rule_enabled("S127"));
        assert!(config.is_rule_enabled("S2436"));
    }

    #[test]
    fn test_rule_enabled_respects_defaults() {
        let mut config = Config::new();

        assert!(config.is_rule_enabled("S2068"));
        assert!(!config.is_rule_enabled("S2436"));
        assert!(config.is_rule_enabled("custom-rule"));

        config.rules.enabled.push("s2436".to_string());
        assert!(config.is_rule_enabled("S2436"));

        config.rules.disabled.push("S2436".to_string());
        assert!(!config.is_rule_enabled("S2436"));
    }

    #[test]
    fn test_only_restricts_rules() {
        let mut config = Config::new();
        config.rules.only = vec!["S1186".to_string(), "S2436".to_string()];

        assert!(config.is_rule_enabled("S1186"));
        assert!(config.is_rule_enabled("S2436"));
        assert!(!config.is_rule_enabled("S2068"));

        config.rules.disabled.push("S1186".to_string());
        assert!(!config.is_rule_enabled("S1186"));
    }

    #[test]
    fn test_severity_override() {
        let mut config = Config::new();
        config.rules.severity.insert("S127".to_string(), Severity::Error);

        assert_eq!(config.get_severity_override("S127"), Some(Severity::Error));
        assert_eq!(config.get_severity_override("S2068"), None);
    }

    #[test]
    fn test_per_file_ignore() {
        let mut config = Config::new();
        config
            .rules
            .per_file
            .insert("**/Tests/**".to_string(), vec!["S1186".to_string()]);
        config
            .rules
            .per_file
            .insert("**/Generated.cs".to_string(), vec!["all".to_string()]);

        assert!(config.should_ignore_rule_for_file("S1186", Path::new("src/Tests/FooTests.cs")));
        assert!(!config.should_ignore_rule_for_file("S2068", Path::new("src/Tests/FooTests.cs")));
        assert!(config.should_ignore_rule_for_file("S2068", Path::new("src/Generated.cs")));
        assert!(!config.should_ignore_rule_for_file("S1186", Path::new("src/Service.cs")));
    }

    #[test]
    fn test_yaml_deserialize() {
        let yaml = r#"
engine:
  parallel: false
  jobs: 4
  analyze_generated: true
output:
  format: sarif
rules:
  disabled:
    - S127
  severity:
    S2068: error
parameters:
  credentialWords: "secret, token"
  maxGenericParametersInClass: 4
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(!config.engine.parallel);
        assert_eq!(config.engine.jobs, 4);
        assert!(config.engine.analyze_generated);
        assert_eq!(config.output.format, OutputFormat::Sarif);
        assert_eq!(config.get_severity_override("S2068"), Some(Severity::Error));

        let settings = RuleSettings::from_config(&config).unwrap();
        assert_eq!(settings.max_generic_parameters_in_class, 4);
        assert_eq!(settings.max_generic_parameters_in_method, 3);
        assert_eq!(settings.credential_words.get().words(), ["secret", "token"]);
    }

    #[test]
    fn test_integer_parameters_accept_numeric_strings() {
        let mut config = Config::new();
        config
            .parameters
            .insert(MAX_IN_METHOD_KEY.to_string(), serde_yaml::Value::String(" 5 ".to_string()));
        config
            .parameters
            .insert(MAX_IN_CLASS_ALIAS.to_string(), serde_yaml::Value::from(1));

        let settings = RuleSettings::from_config(&config).unwrap();
        assert_eq!(settings.max_generic_parameters_in_method, 5);
        assert_eq!(settings.max_generic_parameters_in_class, 1);
    }

    #[test]
    fn test_invalid_integer_parameter() {
        let mut config = Config::new();
        config
            .parameters
            .insert(MAX_IN_CLASS_KEY.to_string(), serde_yaml::Value::String("many".to_string()));

        match RuleSettings::from_config(&config) {
            Err(ConfigError::InvalidParameter { key, value, .. }) => {
                assert_eq!(key, MAX_IN_CLASS_KEY);
                assert_eq!(value, "many");
            }
            other => panic!("expected InvalidParameter, got {:?}", other),
        }

        config
            .parameters
            .insert(MAX_IN_CLASS_KEY.to_string(), serde_yaml::Value::from(-1));
        assert!(RuleSettings::from_config(&config).is_err());
    }

    #[test]
    fn test_credential_words_from_sequence() {
        let yaml = "parameters:\n  credentialWords: [Secret, token, secret]\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let settings = RuleSettings::from_config(&config).unwrap();
        assert_eq!(settings.credential_words.get().words(), ["secret", "token"]);
    }

    #[test]
    fn test_unknown_parameter_is_ignored() {
        let mut config = Config::new();
        config
            .parameters
            .insert("maxLineLength".to_string(), serde_yaml::Value::from(120));
        let settings = RuleSettings::from_config(&config).unwrap();
        assert_eq!(settings.max_generic_parameters_in_class, DEFAULT_MAX_IN_CLASS);
    }

    #[test]
    fn test_load_json_and_validate() {
        let dir = TempDir::new().unwrap();
        let good = write(
            &dir,
            "netlint.json",
            r#"{ "output": { "format": "json" }, "parameters": { "maxGenericParametersInClass": "3" } }"#,
        );
        let config = Config::load(&good).unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);

        let bad = write(
            &dir,
            "bad.json",
            r#"{ "parameters": { "maxGenericParametersInMethod": true } }"#,
        );
        assert!(matches!(
            Config::load(&bad),
            Err(ConfigError::InvalidParameter { .. })
        ));

        let unknown = write(&dir, "netlint.toml", "");
        assert!(matches!(Config::load(&unknown), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_extends_preset_and_file() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "base.yaml",
            "rules:\n  disabled: [S127]\nparameters:\n  maxGenericParametersInClass: 5\n",
        );
        let child = write(
            &dir,
            ".netlintrc.yaml",
            "extends: [all, base.yaml]\nparameters:\n  maxGenericParametersInClass: 6\n",
        );

        let config = Config::load(&child).unwrap();
        assert!(config.is_rule_enabled("S2436"));
        assert!(!config.is_rule_enabled("S127"));
        let settings = RuleSettings::from_config(&config).unwrap();
        assert_eq!(settings.max_generic_parameters_in_class, 6);
    }

    #[test]
    fn test_extends_unknown_preset() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "netlint.yaml", "extends: [strictest]\n");
        match Config::load(&path) {
            Err(ConfigError::UnknownPreset(name)) => assert_eq!(name, "strictest"),
            other => panic!("expected UnknownPreset, got {:?}", other),
        }
    }

    #[test]
    fn test_extends_cycle_hits_depth_limit() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "loop.yaml", "extends: [loop.yaml]\n");
        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));
    }
}
