//! Rule descriptors, registration and per-node evaluation context

use crate::diagnostic::{Diagnostic, Location, Severity};
use crate::engine::RuleTiming;
use crate::language::Language;
use crate::semantic::SemanticModel;
use crate::source::SourceUnit;
use crate::syntax::{KindSet, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Rule category for grouping related rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    /// Code that is definitely wrong
    Correctness,
    /// Code that is likely wrong or suspicious
    Suspicious,
    /// Idiomatic and consistent style rules
    #[default]
    Style,
    /// Security-sensitive code to review
    Security,
    /// Code that is harder to read, test or change than it should be
    Maintainability,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCategory::Correctness => write!(f, "correctness"),
            RuleCategory::Suspicious => write!(f, "suspicious"),
            RuleCategory::Style => write!(f, "style"),
            RuleCategory::Security => write!(f, "security"),
            RuleCategory::Maintainability => write!(f, "maintainability"),
        }
    }
}

impl std::str::FromStr for RuleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "correctness" => Ok(RuleCategory::Correctness),
            "suspicious" => Ok(RuleCategory::Suspicious),
            "style" => Ok(RuleCategory::Style),
            "security" => Ok(RuleCategory::Security),
            "maintainability" => Ok(RuleCategory::Maintainability),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// Type of a rule parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    String,
    Integer,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKind::String => write!(f, "string"),
            ParameterKind::Integer => write!(f, "integer"),
        }
    }
}

/// A configurable rule setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleParameter {
    pub key: &'static str,
    pub kind: ParameterKind,
    pub description: &'static str,
    pub default: &'static str,
}

/// Static metadata of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleDescriptor {
    /// Unique rule identifier (e.g., "S2068")
    pub id: &'static str,
    /// Short human-readable title
    pub title: &'static str,
    /// Message template with `{0}`-style placeholders
    pub message_format: &'static str,
    pub severity: Severity,
    pub category: RuleCategory,
    pub enabled_by_default: bool,
    pub description: &'static str,
    pub parameters: &'static [RuleParameter],
}

impl RuleDescriptor {
    /// Substitute `{0}`, `{1}`, ... with the given arguments
    pub fn format_message(&self, args: &[String]) -> String {
        let mut message = self.message_format.to_string();
        for (i, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{}}}", i), arg);
        }
        message
    }
}

/// Action invoked for every visited node of a registered kind
pub type NodeAction<L> = Arc<dyn Fn(&mut NodeContext<'_, L>) + Send + Sync>;

/// A rule's registration against one grammar
pub trait Rule<L: Language>: Send + Sync {
    fn descriptor(&self) -> &'static RuleDescriptor;

    /// Register node actions; called once when the engine is built
    fn initialize(&self, registry: &mut RuleRegistry<L>);
}

pub(crate) struct RegisteredAction<L: Language> {
    pub(crate) descriptor: &'static RuleDescriptor,
    pub(crate) action: NodeAction<L>,
}

/// Node actions of all rules of one grammar, keyed by kind
pub struct RuleRegistry<L: Language> {
    language: L,
    actions: HashMap<L::Kind, Vec<RegisteredAction<L>>>,
    descriptors: Vec<&'static RuleDescriptor>,
}

impl<L: Language> Default for RuleRegistry<L> {
    fn default() -> Self {
        Self::new(L::default())
    }
}

impl<L: Language> RuleRegistry<L> {
    pub fn new(language: L) -> Self {
        Self {
            language,
            actions: HashMap::new(),
            descriptors: Vec::new(),
        }
    }

    /// Build a registry from a rule list
    pub fn with_rules(rules: &[Box<dyn Rule<L>>]) -> Self {
        let mut registry = Self::default();
        for rule in rules {
            registry.add_rule(rule.as_ref());
        }
        registry
    }

    pub fn add_rule(&mut self, rule: &dyn Rule<L>) {
        let descriptor = rule.descriptor();
        log::debug!(
            "registering {} for {}",
            descriptor.id,
            self.language.id()
        );
        if !self.descriptors.iter().any(|d| d.id == descriptor.id) {
            self.descriptors.push(descriptor);
        }
        rule.initialize(self);
    }

    pub fn language(&self) -> &L {
        &self.language
    }

    /// Run `action` on every node whose kind is in `kinds`
    pub fn register_node_action<F>(
        &mut self,
        descriptor: &'static RuleDescriptor,
        kinds: KindSet<L::Kind>,
        action: F,
    ) where
        F: Fn(&mut NodeContext<'_, L>) + Send + Sync + 'static,
    {
        let action: NodeAction<L> = Arc::new(action);
        for kind in kinds.iter() {
            self.actions.entry(kind).or_default().push(RegisteredAction {
                descriptor,
                action: Arc::clone(&action),
            });
        }
    }

    pub(crate) fn actions_for(&self, kind: L::Kind) -> &[RegisteredAction<L>] {
        self.actions.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any action listens to `kind`
    pub fn handles(&self, kind: L::Kind) -> bool {
        self.actions.contains_key(&kind)
    }

    pub fn descriptors(&self) -> &[&'static RuleDescriptor] {
        &self.descriptors
    }

    pub fn action_count(&self) -> usize {
        self.actions.values().map(Vec::len).sum()
    }

    /// Run every registered action over `unit`
    pub fn analyze(&self, unit: &SourceUnit) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut timings = HashMap::new();
        self.walk(unit, &WalkOptions::default(), &mut diagnostics, &mut timings);
        diagnostics
    }

    /// Pre-order walk dispatching each node to the actions of its kind
    ///
    /// Returns `false` when the walk stopped on cancellation.
    pub(crate) fn walk(
        &self,
        unit: &SourceUnit,
        options: &WalkOptions<'_>,
        diagnostics: &mut Vec<Diagnostic>,
        timings: &mut HashMap<String, RuleTiming>,
    ) -> bool {
        for node in unit.tree.root().descendants_and_self() {
            if options.is_cancelled() {
                return false;
            }
            let Some(kind) = self.language.kind(node) else {
                continue;
            };
            let actions = self.actions_for(kind);
            if actions.is_empty() {
                continue;
            }

            self.dispatch(actions, unit, node, VisitKind::Declaration, options, diagnostics, timings);
            if self.language.is_positional_record(node) {
                self.dispatch(
                    actions,
                    unit,
                    node,
                    VisitKind::SynthesizedPrimaryConstructor,
                    options,
                    diagnostics,
                    timings,
                );
            }
        }
        true
    }

    #[allow(clippy::too_many_arguments)]
    fn dispatch(
        &self,
        actions: &[RegisteredAction<L>],
        unit: &SourceUnit,
        node: Node<'_>,
        visit: VisitKind,
        options: &WalkOptions<'_>,
        diagnostics: &mut Vec<Diagnostic>,
        timings: &mut HashMap<String, RuleTiming>,
    ) {
        for registered in actions {
            let rule_id = registered.descriptor.id;
            if !options.is_enabled(rule_id) {
                continue;
            }

            let before = diagnostics.len();
            let start = Instant::now();
            let mut ctx = NodeContext::new(&self.language, unit, node, visit, diagnostics);
            (registered.action)(&mut ctx);
            let elapsed = start.elapsed();

            let timing = timings
                .entry(rule_id.to_string())
                .or_insert_with(|| RuleTiming::new(rule_id));
            timing.total_time += elapsed;
            timing.evaluation_count += 1;
            timing.match_count += diagnostics.len() - before;
        }
    }
}

/// Rule filter and cancellation flag consulted during a walk
#[derive(Default)]
pub(crate) struct WalkOptions<'a> {
    pub(crate) enabled: Option<&'a (dyn Fn(&str) -> bool + Sync)>,
    pub(crate) cancelled: Option<&'a AtomicBool>,
}

impl WalkOptions<'_> {
    fn is_enabled(&self, rule_id: &str) -> bool {
        self.enabled.is_none_or(|enabled| enabled(rule_id))
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Which compiler pass a node is visited in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitKind {
    /// The declaration as written
    #[default]
    Declaration,
    /// A positional record revisited as its synthesized primary constructor
    SynthesizedPrimaryConstructor,
}

/// Evaluation context for one node visit
pub struct NodeContext<'a, L: Language> {
    language: &'a L,
    unit: &'a SourceUnit,
    node: Node<'a>,
    visit: VisitKind,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a, L: Language> NodeContext<'a, L> {
    pub(crate) fn new(
        language: &'a L,
        unit: &'a SourceUnit,
        node: Node<'a>,
        visit: VisitKind,
        diagnostics: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            language,
            unit,
            node,
            visit,
            diagnostics,
        }
    }

    pub fn node(&self) -> Node<'a> {
        self.node
    }

    pub fn language(&self) -> &'a L {
        self.language
    }

    pub fn unit(&self) -> &'a SourceUnit {
        self.unit
    }

    pub fn model(&self) -> &'a dyn SemanticModel {
        &self.unit.model
    }

    pub fn is_test_project(&self) -> bool {
        self.unit.test_project
    }

    pub fn visit(&self) -> VisitKind {
        self.visit
    }

    /// The node is a positional record seen again as its primary constructor
    pub fn is_redundant_positional_record_context(&self) -> bool {
        self.visit == VisitKind::SynthesizedPrimaryConstructor
    }

    /// Emit a diagnostic at `at` with the descriptor's message
    pub fn report(&mut self, descriptor: &'static RuleDescriptor, at: Node<'_>, args: &[String]) {
        let location = Location::from_span(&self.unit.path, at.span());
        let message = descriptor.format_message(args);
        self.diagnostics.push(
            Diagnostic::new(descriptor.id, descriptor.severity, &message, location)
                .with_help(descriptor.title),
        );
    }
}
