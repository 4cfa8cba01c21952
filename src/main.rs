//! netlint CLI - static analysis for C# and Visual Basic syntax trees
//!
//! Reads JSON interchange documents produced by a compiler front-end and
//! reports rule violations.

use clap::{Parser, ValueEnum};
use colored::Colorize;
use glob::glob;
use globset::{Glob, GlobSet, GlobSetBuilder};
use netlint::config::{ColorMode, Config, FilesConfig, OutputFormat};
use netlint::engine::Engine;
use netlint::output::{JsonFormatter, OutputFormatter, SarifFormatter, TextFormatter};
use netlint::rule::RuleDescriptor;
use netlint::rules::{all_descriptors, find_descriptor};
use netlint::Severity;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "netlint",
    version,
    about = "C# and Visual Basic analyzer",
    long_about = "Pattern-tracking static analysis over C# and Visual Basic syntax trees \
                  exported as JSON interchange documents."
)]
struct Cli {
    /// Files, directories or glob patterns to analyze
    files: Vec<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Disable specific rules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    disable: Option<Vec<String>>,

    /// Enable rules that are off by default (comma-separated)
    #[arg(long, value_delimiter = ',')]
    enable: Option<Vec<String>>,

    /// Only run specific rules (comma-separated)
    #[arg(long, value_delimiter = ',')]
    select: Option<Vec<String>>,

    /// Minimum severity to report
    #[arg(long, value_enum)]
    min_severity: Option<MinSeverity>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Show detailed information about a specific rule
    #[arg(long)]
    explain: Option<String>,

    /// Show per-rule timing statistics
    #[arg(long)]
    timing: bool,

    /// Exit with 0 even if issues are found
    #[arg(long)]
    exit_zero: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Sarif,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::Sarif => OutputFormat::Sarif,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum MinSeverity {
    Info,
    Warning,
    Error,
}

impl From<MinSeverity> for Severity {
    fn from(level: MinSeverity) -> Self {
        match level {
            MinSeverity::Info => Severity::Info,
            MinSeverity::Warning => Severity::Warning,
            MinSeverity::Error => Severity::Error,
        }
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{}: {}", "error".red().bold(), message);
    std::process::exit(1);
}

fn severity_label(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Error => "error".red(),
        Severity::Warning => "warning".yellow(),
        Severity::Info => "info".blue(),
    }
}

/// Helper function to print a rule in a consistent format
fn print_rule(rule: &RuleDescriptor, config: &Config) {
    let state = if config.is_rule_enabled(rule.id) {
        "".normal()
    } else {
        " [disabled]".dimmed()
    };
    println!(
        "    {} [{}] ({}){}",
        rule.id.cyan(),
        severity_label(rule.severity),
        rule.category,
        state
    );
    println!("      {}", rule.title);
}

/// Print detailed rule explanation
fn explain_rule(rule: &RuleDescriptor) {
    println!("{}", "Rule Details".bold());
    println!();
    println!("  {}: {}", "ID".bold(), rule.id.cyan());
    println!("  {}: {}", "Name".bold(), rule.title);
    println!("  {}: {}", "Severity".bold(), severity_label(rule.severity));
    println!("  {}: {}", "Category".bold(), rule.category);
    println!(
        "  {}: {}",
        "Enabled by default".bold(),
        if rule.enabled_by_default { "yes" } else { "no" }
    );

    println!();
    println!("  {}", "Description".bold());
    println!("  {}", rule.description);

    println!();
    println!("  {}", "Message".bold());
    println!("  {}", rule.message_format);

    if !rule.parameters.is_empty() {
        println!();
        println!("  {}", "Parameters".bold());
        for parameter in rule.parameters {
            println!(
                "    {} ({}, default {}): {}",
                parameter.key.cyan(),
                parameter.kind,
                parameter.default,
                parameter.description
            );
        }
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}

/// Expand directories and glob patterns into interchange documents
///
/// Directories are searched recursively for files matching `files.include`;
/// `files.exclude` applies to everything.
fn collect_files(patterns: &[String], files: &FilesConfig) -> Result<Vec<PathBuf>, String> {
    let include = build_globset(&files.include).map_err(|e| format!("Invalid include pattern: {}", e))?;
    let exclude = build_globset(&files.exclude).map_err(|e| format!("Invalid exclude pattern: {}", e))?;

    let mut collected: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        let (expanded, from_directory) = if path.is_dir() {
            (format!("{}/**/*", pattern.trim_end_matches(['/', '\\'])), true)
        } else {
            (pattern.clone(), false)
        };

        let entries = glob(&expanded).map_err(|e| format!("Invalid pattern '{}': {}", pattern, e))?;
        for entry in entries.flatten() {
            if !entry.is_file() || exclude.is_match(&entry) {
                continue;
            }
            if from_directory && !include.is_match(&entry) {
                continue;
            }
            collected.push(entry);
        }
    }

    collected.sort();
    collected.dedup();
    Ok(collected)
}

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Some(rule_id) = &cli.explain {
        match find_descriptor(rule_id) {
            Some(rule) => explain_rule(rule),
            None => fail(&format!("Rule '{}' not found", rule_id)),
        }
        return;
    }

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .unwrap_or_else(|e| fail(&format!("Failed to load config: {}", e))),
        None => Config::load_default()
            .unwrap_or_else(|e| fail(&format!("Failed to load config: {}", e))),
    };

    config.merge_cli(
        cli.format.map(OutputFormat::from),
        Some(cli.verbose),
        cli.jobs,
        cli.disable,
        cli.enable,
        cli.select,
    );
    if config.output.color == ColorMode::Never {
        colored::control::set_override(false);
    } else if config.output.color == ColorMode::Always && !cli.no_color {
        colored::control::set_override(true);
    }

    if cli.list_rules {
        println!("{}", "Available rules:".bold());
        println!();
        for rule in all_descriptors() {
            print_rule(rule, &config);
        }
        return;
    }

    if cli.files.is_empty() {
        eprintln!("{}: No files specified", "error".red().bold());
        eprintln!();
        eprintln!("Usage: netlint [OPTIONS] <FILES>...");
        eprintln!();
        eprintln!("For more information, try '--help'");
        std::process::exit(2);
    }

    let files = collect_files(&cli.files, &config.files).unwrap_or_else(|e| fail(&e));
    if files.is_empty() {
        fail("No files found to analyze");
    }
    if config.output.verbose {
        eprintln!("Analyzing {} file(s)", files.len());
    }

    let engine = Engine::new(config.clone())
        .unwrap_or_else(|e| fail(&format!("Invalid configuration: {}", e)));
    let mut result = engine.analyze_files(&files);

    // Filter by minimum severity
    if let Some(level) = cli.min_severity {
        let min = Severity::from(level);
        result.diagnostics.retain(|d| d.severity >= min);

        // Recalculate counts
        result.error_count = result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        result.warning_count = result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        result.info_count = result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Info)
            .count();
    }

    // Create formatter
    let formatter: Box<dyn OutputFormatter> = match config.output.format {
        OutputFormat::Text => {
            let mut f = TextFormatter::new();
            if cli.no_color || config.output.color == ColorMode::Never {
                f = f.without_color();
            }
            f.show_stats = config.output.statistics;
            f.show_help = config.output.verbose;
            Box::new(f)
        }
        OutputFormat::Json => {
            let f = JsonFormatter::new();
            Box::new(if cli.pretty { f.pretty() } else { f })
        }
        OutputFormat::Sarif => Box::new(
            SarifFormatter::new("netlint", env!("CARGO_PKG_VERSION"))
                .with_rules(engine.rule_descriptors()),
        ),
    };

    print!("{}", formatter.format(&result));

    if cli.timing {
        eprintln!();
        eprintln!("{}", result.format_timings());
    }

    let exit_code = if cli.exit_zero { 0 } else { result.exit_code() };
    std::process::exit(exit_code);
}
