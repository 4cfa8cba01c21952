//! Property read and write sites

use super::Condition;
use crate::language::Language;
use crate::rule::{NodeContext, RuleDescriptor, RuleRegistry};
use crate::semantic::{KnownType, SymbolKind};

/// Condition over a simple name that may access a property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyAccessCondition {
    /// The access is the target of an assignment
    MatchSetter,

    /// The access reads the property
    MatchGetter,

    /// The access is assigned a compile-time constant
    AssignedValueIsConstant,

    /// The name resolves to the property `name` declared in `owner`
    MatchProperty { owner: KnownType, name: &'static str },

    /// All conditions must be true (AND)
    All(Vec<PropertyAccessCondition>),

    /// Any condition must be true (OR)
    Any(Vec<PropertyAccessCondition>),

    /// Condition must be false (NOT)
    Not(Box<PropertyAccessCondition>),
}

impl Condition for PropertyAccessCondition {
    fn evaluate<L: Language>(&self, ctx: &NodeContext<'_, L>) -> bool {
        let language = ctx.language();
        let node = ctx.node();

        match self {
            PropertyAccessCondition::MatchSetter => language.is_left_side_of_assignment(node),

            PropertyAccessCondition::MatchGetter => !language.is_left_side_of_assignment(node),

            PropertyAccessCondition::AssignedValueIsConstant => {
                let target = language.climb_name(node);
                target
                    .parent()
                    .filter(|assignment| language.assignment_left(*assignment) == Some(target))
                    .and_then(|assignment| language.assignment_right(assignment))
                    .is_some_and(|value| language.is_constant(value, ctx.model()))
            }

            PropertyAccessCondition::MatchProperty { owner, name } => {
                // cheap textual check before resolving the symbol
                let named = language
                    .identifier_text(node)
                    .is_some_and(|text| language.name_comparison().equals(text, name));
                named
                    && language.symbol(node, ctx.model()).is_some_and(|symbol| {
                        symbol.kind == SymbolKind::Property
                            && language.name_comparison().equals(&symbol.name, name)
                            && symbol.is_member_of(*owner)
                    })
            }

            PropertyAccessCondition::All(conditions) => conditions.iter().all(|c| c.evaluate(ctx)),

            PropertyAccessCondition::Any(conditions) => conditions.iter().any(|c| c.evaluate(ctx)),

            PropertyAccessCondition::Not(condition) => !condition.evaluate(ctx),
        }
    }
}

/// Tracks property accesses through simple names
pub struct PropertyAccessTracker;

impl PropertyAccessTracker {
    pub fn track<L: Language>(
        registry: &mut RuleRegistry<L>,
        descriptor: &'static RuleDescriptor,
        message_args: &[&str],
        conditions: Vec<PropertyAccessCondition>,
    ) {
        let kinds = registry.language().identifier_name_kinds();
        super::track(registry, kinds, descriptor, message_args, conditions);
    }
}
