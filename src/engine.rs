//! Core analysis engine

use crate::config::{Config, ConfigError, RuleSettings};
use crate::diagnostic::{Diagnostic, Location, Severity};
use crate::language::{CSharp, VisualBasic};
use crate::rule::{RuleDescriptor, RuleRegistry, WalkOptions};
use crate::rules::{self, CredentialWordSet};
use crate::source::{LanguageId, SourceUnit};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-rule timing statistics
#[derive(Debug, Clone, Default)]
pub struct RuleTiming {
    /// Rule ID
    pub rule_id: String,
    /// Total time spent on this rule
    pub total_time: Duration,
    /// Number of times the rule was evaluated
    pub evaluation_count: usize,
    /// Number of diagnostics reported
    pub match_count: usize,
}

impl RuleTiming {
    /// Create a new timing entry
    pub fn new(rule_id: &str) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            ..Default::default()
        }
    }

    /// Average time per evaluation
    pub fn avg_time(&self) -> Duration {
        if self.evaluation_count > 0 {
            let nanos = self.total_time.as_nanos() / self.evaluation_count as u128;
            Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
        } else {
            Duration::ZERO
        }
    }
}

/// Result of an analysis run
#[derive(Debug, Default)]
pub struct AnalysisResult {
    /// All diagnostics
    pub diagnostics: Vec<Diagnostic>,

    /// Units processed
    pub files_processed: usize,

    /// Units with errors
    pub files_with_errors: usize,

    /// Units with warnings
    pub files_with_warnings: usize,

    /// Total errors
    pub error_count: usize,

    /// Total warnings
    pub warning_count: usize,

    /// Total info messages
    pub info_count: usize,

    /// Processing duration
    pub duration: Duration,

    /// Per-rule timing statistics (rule_id -> timing)
    pub rule_timings: HashMap<String, RuleTiming>,

    /// The run stopped early on a cancellation request
    pub cancelled: bool,
}

impl AnalysisResult {
    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        self.warning_count > 0
    }

    /// Check if result is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        self.error_count == 0 && self.warning_count == 0
    }

    /// Get exit code (0 = success, 1 = warnings, 2 = errors)
    pub fn exit_code(&self) -> i32 {
        if self.error_count > 0 {
            2
        } else if self.warning_count > 0 {
            1
        } else {
            0
        }
    }

    /// Result for a single unit's diagnostics
    fn for_unit(diagnostics: Vec<Diagnostic>) -> Self {
        let mut result = Self {
            files_processed: 1,
            ..Self::default()
        };
        for diag in &diagnostics {
            match diag.severity {
                Severity::Error => result.error_count += 1,
                Severity::Warning => result.warning_count += 1,
                Severity::Info => result.info_count += 1,
            }
        }
        if result.error_count > 0 {
            result.files_with_errors = 1;
        }
        if result.warning_count > 0 {
            result.files_with_warnings = 1;
        }
        result.diagnostics = diagnostics;
        result
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: AnalysisResult) {
        self.diagnostics.extend(other.diagnostics);
        self.files_processed += other.files_processed;
        self.files_with_errors += other.files_with_errors;
        self.files_with_warnings += other.files_with_warnings;
        self.error_count += other.error_count;
        self.warning_count += other.warning_count;
        self.info_count += other.info_count;
        self.cancelled |= other.cancelled;

        for (rule_id, timing) in other.rule_timings {
            let entry = self
                .rule_timings
                .entry(rule_id)
                .or_insert_with(|| RuleTiming::new(&timing.rule_id));
            entry.total_time += timing.total_time;
            entry.evaluation_count += timing.evaluation_count;
            entry.match_count += timing.match_count;
        }
    }

    /// Sort diagnostics by file, line, column, rule and message
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    }

    /// Get rule timings sorted by total time (descending)
    pub fn sorted_timings(&self) -> Vec<&RuleTiming> {
        let mut timings: Vec<_> = self.rule_timings.values().collect();
        timings.sort_by(|a, b| {
            b.total_time
                .cmp(&a.total_time)
                .then_with(|| a.rule_id.cmp(&b.rule_id))
        });
        timings
    }

    /// Format timing statistics as a string
    pub fn format_timings(&self) -> String {
        let mut output = String::new();
        let timings = self.sorted_timings();

        if timings.is_empty() {
            return "No timing data available".to_string();
        }

        output.push_str("Rule Timing Statistics:\n");
        output.push_str(&format!(
            "{:<12} {:>12} {:>12} {:>10} {:>12}\n",
            "Rule ID", "Total", "Avg", "Evals", "Matches"
        ));
        output.push_str(&"-".repeat(62));
        output.push('\n');

        for timing in timings {
            let total_ms = timing.total_time.as_secs_f64() * 1000.0;
            let avg_us = timing.avg_time().as_secs_f64() * 1_000_000.0;

            output.push_str(&format!(
                "{:<12} {:>10.2}ms {:>10.2}µs {:>10} {:>12}\n",
                timing.rule_id, total_ms, avg_us, timing.evaluation_count, timing.match_count
            ));
        }

        output
    }
}

/// Shared flag that stops an analysis run
///
/// Once set, no new unit and no new node visit starts; a node evaluation
/// already in progress runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    fn flag(&self) -> &AtomicBool {
        &self.0
    }
}

/// The main analysis engine
pub struct Engine {
    /// Configuration
    config: Config,

    /// Validated rule parameters
    settings: RuleSettings,

    csharp: RuleRegistry<CSharp>,
    visual_basic: RuleRegistry<VisualBasic>,

    cancellation: CancellationToken,
}

impl Engine {
    /// Create an engine, validating the configured rule parameters
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let settings = RuleSettings::from_config(&config)?;
        let csharp = RuleRegistry::with_rules(&rules::csharp_rules(&settings));
        let visual_basic = RuleRegistry::with_rules(&rules::visual_basic_rules(&settings));
        log::debug!(
            "engine ready: {} C# actions, {} VB actions",
            csharp.action_count(),
            visual_basic.action_count()
        );

        Ok(Self {
            config,
            settings,
            csharp,
            visual_basic,
            cancellation: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn settings(&self) -> &RuleSettings {
        &self.settings
    }

    /// Token that cancels runs of this engine
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Replace the credential words used by S2068; later node visits see the new set
    pub fn set_credential_words(&self, list: &str) -> Result<(), ConfigError> {
        let words = CredentialWordSet::parse(list)?;
        self.settings.credential_words.set(words);
        Ok(())
    }

    /// Descriptors of every rule registered for either grammar
    pub fn rule_descriptors(&self) -> Vec<&'static RuleDescriptor> {
        let mut descriptors: Vec<&'static RuleDescriptor> = self.csharp.descriptors().to_vec();
        for descriptor in self.visual_basic.descriptors() {
            if !descriptors.iter().any(|d| d.id == descriptor.id) {
                descriptors.push(descriptor);
            }
        }
        descriptors
    }

    /// Analyze several units
    pub fn analyze(&self, units: &[SourceUnit]) -> AnalysisResult {
        self.run(units, |unit| self.analyze_unit(unit))
    }

    /// Load interchange documents from disk and analyze them
    ///
    /// A document that cannot be read or parsed becomes a `parse-error`
    /// diagnostic for that file; other files are unaffected.
    pub fn analyze_files(&self, files: &[PathBuf]) -> AnalysisResult {
        self.run(files, |path| self.analyze_file(path))
    }

    fn analyze_file(&self, path: &Path) -> AnalysisResult {
        if self.cancellation.is_cancelled() {
            return AnalysisResult {
                cancelled: true,
                ..AnalysisResult::default()
            };
        }
        log::debug!("loading {}", path.display());
        match SourceUnit::load(path) {
            Ok(unit) => self.analyze_unit(&unit),
            Err(e) => {
                log::warn!("skipping {}: {}", path.display(), e);
                AnalysisResult::for_unit(vec![Diagnostic::new(
                    "parse-error",
                    Severity::Error,
                    &format!("Parse error: {}", e),
                    Location::new(path.to_path_buf(), 1, 1),
                )])
            }
        }
    }

    /// Analyze one unit with the registry of its grammar
    pub fn analyze_unit(&self, unit: &SourceUnit) -> AnalysisResult {
        if self.cancellation.is_cancelled() {
            return AnalysisResult {
                cancelled: true,
                ..AnalysisResult::default()
            };
        }
        if unit.generated && !self.config.engine.analyze_generated {
            log::debug!("skipping generated unit {}", unit.path.display());
            return AnalysisResult {
                files_processed: 1,
                ..AnalysisResult::default()
            };
        }
        log::debug!("analyzing {} ({})", unit.path.display(), unit.language);

        let enabled = |rule_id: &str| {
            self.config.is_rule_enabled(rule_id)
                && !self.config.should_ignore_rule_for_file(rule_id, &unit.path)
        };
        let options = WalkOptions {
            enabled: Some(&enabled),
            cancelled: Some(self.cancellation.flag()),
        };

        let mut diagnostics = Vec::new();
        let mut timings = HashMap::new();
        let completed = match unit.language {
            LanguageId::CSharp => self.csharp.walk(unit, &options, &mut diagnostics, &mut timings),
            LanguageId::VisualBasic => {
                self.visual_basic
                    .walk(unit, &options, &mut diagnostics, &mut timings)
            }
        };

        for diag in &mut diagnostics {
            if let Some(severity) = self.config.get_severity_override(&diag.rule_id) {
                diag.severity = severity;
            }
        }

        let mut result = AnalysisResult::for_unit(diagnostics);
        result.rule_timings = timings;
        result.cancelled = !completed;
        result.sort();
        result
    }

    fn run<T, F>(&self, items: &[T], analyze: F) -> AnalysisResult
    where
        T: Sync,
        F: Fn(&T) -> AnalysisResult + Sync + Send,
    {
        let start = Instant::now();

        let results: Vec<AnalysisResult> = match self.thread_pool() {
            Some(pool) => pool.install(|| items.par_iter().map(&analyze).collect()),
            None => items.iter().map(&analyze).collect(),
        };

        let mut combined = AnalysisResult::default();
        for result in results {
            combined.merge(result);
        }
        combined.sort();
        combined.duration = start.elapsed();

        log::info!(
            "analyzed {} unit(s) in {:.2?}: {} error(s), {} warning(s), {} info",
            combined.files_processed,
            combined.duration,
            combined.error_count,
            combined.warning_count,
            combined.info_count
        );
        if combined.cancelled {
            log::info!("analysis cancelled");
        }
        combined
    }

    fn thread_pool(&self) -> Option<rayon::ThreadPool> {
        if !self.config.engine.parallel {
            return None;
        }
        let threads = if self.config.engine.jobs > 0 {
            self.config.engine.jobs
        } else {
            num_cpus::get()
        };
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => Some(pool),
            Err(e) => {
                log::warn!("falling back to sequential analysis: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::{Symbol, SymbolKind};
    use crate::syntax::SourceBuilder;
    use pretty_assertions::assert_eq;

    /// `DateTime.Now` in `path`
    fn clock_unit(path: &str, language: LanguageId, generated: bool) -> SourceUnit {
        let mut b = SourceBuilder::new(path, language).generated(generated);
        let now = b.add_symbol(
            Symbol::new(SymbolKind::Property, "Now").with_containing_type("System.DateTime"),
        );
        b.start_node("SimpleMemberAccessExpression");
        b.start_node("IdentifierName");
        b.token("IdentifierToken", "DateTime");
        b.finish_node();
        b.token("DotToken", ".");
        let name = b.start_node("IdentifierName");
        b.token("IdentifierToken", "Now");
        b.finish_node();
        b.finish_node();
        b.bind(name, now);
        b.finish().unwrap()
    }

    fn engine(config: Config) -> Engine {
        Engine::new(config).unwrap()
    }

    #[test]
    fn test_exit_code() {
        let mut result = AnalysisResult::default();
        assert_eq!(result.exit_code(), 0);
        assert!(result.is_clean());

        result.warning_count = 1;
        assert_eq!(result.exit_code(), 1);

        result.error_count = 1;
        assert_eq!(result.exit_code(), 2);
        assert!(result.has_errors());
    }

    #[test]
    fn test_analyze_units_across_grammars() {
        let units = vec![
            clock_unit("b/Clock.vb", LanguageId::VisualBasic, false),
            clock_unit("a/Clock.cs", LanguageId::CSharp, false),
        ];
        let result = engine(Config::default()).analyze(&units);

        assert_eq!(result.files_processed, 2);
        assert_eq!(result.info_count, 2);
        assert_eq!(result.exit_code(), 0);
        let files: Vec<_> = result
            .diagnostics
            .iter()
            .map(|d| d.location.file.to_string_lossy().to_string())
            .collect();
        assert_eq!(files, vec!["a/Clock.cs", "b/Clock.vb"]);
        assert_eq!(result.rule_timings["S6354"].match_count, 2);
        assert!(!result.cancelled);
    }

    #[test]
    fn test_generated_units_are_skipped_unless_configured() {
        let units = vec![clock_unit("Gen.cs", LanguageId::CSharp, true)];
        let result = engine(Config::default()).analyze(&units);
        assert_eq!(result.files_processed, 1);
        assert!(result.diagnostics.is_empty());

        let mut config = Config::default();
        config.engine.analyze_generated = true;
        assert_eq!(engine(config).analyze(&units).diagnostics.len(), 1);
    }

    #[test]
    fn test_config_filters_and_overrides() {
        let units = vec![clock_unit("src/Clock.cs", LanguageId::CSharp, false)];

        let mut config = Config::default();
        config.rules.severity.insert("S6354".to_string(), Severity::Error);
        let result = engine(config).analyze(&units);
        assert_eq!(result.diagnostics[0].severity, Severity::Error);
        assert_eq!(result.exit_code(), 2);
        assert_eq!(result.files_with_errors, 1);

        let mut config = Config::default();
        config.rules.disabled.push("S6354".to_string());
        assert!(engine(config).analyze(&units).diagnostics.is_empty());

        let mut config = Config::default();
        config
            .rules
            .per_file
            .insert("src/**".to_string(), vec!["S6354".to_string()]);
        assert!(engine(config).analyze(&units).diagnostics.is_empty());
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let units: Vec<_> = (0..8)
            .map(|i| clock_unit(&format!("f{}.cs", i), LanguageId::CSharp, false))
            .collect();

        let mut config = Config::default();
        config.engine.parallel = false;
        let sequential = engine(config).analyze(&units);

        let mut config = Config::default();
        config.engine.jobs = 3;
        let parallel = engine(config).analyze(&units);

        assert_eq!(sequential.diagnostics, parallel.diagnostics);
        assert_eq!(parallel.files_processed, 8);
    }

    #[test]
    fn test_cancellation_stops_new_units() {
        let engine = engine(Config::default());
        let token = engine.cancellation_token();
        token.cancel();

        let units = vec![clock_unit("Clock.cs", LanguageId::CSharp, false)];
        let result = engine.analyze(&units);
        assert!(result.cancelled);
        assert_eq!(result.files_processed, 0);
        assert!(result.diagnostics.is_empty());

        token.reset();
        assert_eq!(engine.analyze(&units).diagnostics.len(), 1);
    }

    #[test]
    fn test_invalid_parameters_fail_engine_construction() {
        let mut config = Config::default();
        config.parameters.insert(
            "maxGenericParametersInClass".to_string(),
            serde_yaml::Value::String("two".to_string()),
        );
        assert!(matches!(
            Engine::new(config),
            Err(ConfigError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_set_credential_words() {
        let engine = engine(Config::default());
        engine.set_credential_words("token, apikey").unwrap();
        assert_eq!(
            engine.settings().credential_words.get().words(),
            ["token", "apikey"]
        );
    }

    #[test]
    fn test_rule_descriptors_are_deduplicated() {
        let ids: Vec<_> = engine(Config::default())
            .rule_descriptors()
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["S2068", "S127", "S2436", "S1186", "S6354"]);
    }

    #[test]
    fn test_analyze_files_reports_parse_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let broken = dir.path().join("Broken.cs.json");
        std::fs::write(&broken, "{ not json").unwrap();
        let missing = dir.path().join("Missing.cs.json");

        let result = engine(Config::default()).analyze_files(&[broken.clone(), missing]);
        assert_eq!(result.files_processed, 2);
        assert_eq!(result.error_count, 2);
        assert!(result.diagnostics.iter().all(|d| d.rule_id == "parse-error"));
        assert_eq!(result.diagnostics[0].location.file, broken);
    }

    #[test]
    fn test_timings() {
        let mut result = AnalysisResult::default();
        assert_eq!(result.format_timings(), "No timing data available");

        let mut timing = RuleTiming::new("S127");
        timing.total_time = Duration::from_millis(4);
        timing.evaluation_count = 2;
        result.rule_timings.insert("S127".to_string(), timing);
        assert_eq!(result.rule_timings["S127"].avg_time(), Duration::from_millis(2));
        assert!(result.format_timings().contains("S127"));
    }

    #[test]
    fn test_avg_time_beyond_u32_evaluations() {
        let mut timing = RuleTiming::new("S2068");
        timing.evaluation_count = u32::MAX as usize * 4;
        timing.total_time = Duration::from_secs(u32::MAX as u64 * 4);
        assert_eq!(timing.avg_time(), Duration::from_secs(1));
    }
}
