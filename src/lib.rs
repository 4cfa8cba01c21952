//! netlint - pattern-tracking static analysis for C# and Visual Basic
//!
//! Front-ends hand over syntax trees together with a semantic model, either
//! through [`SourceBuilder`] or as JSON interchange documents. Rules register
//! node actions against kind tables of a grammar; the engine walks every unit
//! once and dispatches each node to the actions listening for its kind.
//!
//! # Architecture
//!
//! ```text
//! CLI/API -> Engine -> RuleRegistry<L> -> NodeContext -> Diagnostic
//!                         ^
//!          Rule<L>::initialize (node actions, trackers)
//! ```
//!
//! Grammar differences live behind the [`Language`] trait, so rules such as
//! [`HardcodedCredentials`] and [`TestableTimeProvider`] are written once and
//! registered for both C# and Visual Basic.
//!
//! # Example
//!
//! ```no_run
//! use netlint::{Config, Engine};
//! use std::path::PathBuf;
//!
//! let engine = Engine::new(Config::default())?;
//! let result = engine.analyze_files(&[PathBuf::from("obj/Program.cs.json")]);
//! for diagnostic in &result.diagnostics {
//!     println!("{}: {}", diagnostic.rule_id, diagnostic.message);
//! }
//! # Ok::<(), netlint::ConfigError>(())
//! ```

pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod language;
pub mod output;
pub mod rule;
pub mod rules;
pub mod semantic;
pub mod source;
pub mod syntax;
pub mod trackers;

// Re-export main types
pub use config::{Config, ConfigError, RuleSettings};
pub use diagnostic::{Diagnostic, Location, Severity};
pub use engine::{AnalysisResult, CancellationToken, Engine, RuleTiming};
pub use language::{CSharp, CSharpKind, Language, VisualBasic, VisualBasicKind};
pub use output::{JsonFormatter, OutputFormatter, SarifFormatter, TextFormatter};
pub use rule::{NodeContext, Rule, RuleCategory, RuleDescriptor, RuleRegistry};
pub use rules::{
    EmptyMethod, HardcodedCredentials, LoopCounterChanged, TestableTimeProvider,
    TooManyGenericParameters,
};
pub use semantic::{KnownType, SemanticModel, Symbol, SymbolKind, SymbolTable};
pub use source::{LanguageId, ParseError, SourceUnit};
pub use syntax::{KindSet, Node, SourceBuilder, SyntaxTree};
pub use trackers::{ObjectCreationCondition, ObjectCreationTracker, PropertyAccessCondition, PropertyAccessTracker};
