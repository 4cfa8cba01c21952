//! Object instantiation sites

use super::Condition;
use crate::language::{Argument, Language};
use crate::rule::{NodeContext, RuleDescriptor, RuleRegistry};
use crate::semantic::{KnownType, SymbolKind};

/// Condition over an object creation expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectCreationCondition {
    /// The invoked constructor is declared in the type
    MatchConstructor(KnownType),

    /// The argument at the index exists and has the type
    ArgumentAtIndexIs(usize, KnownType),

    /// The argument at the index exists and is a compile-time constant
    ArgumentAtIndexIsConst(usize),

    /// All conditions must be true (AND)
    All(Vec<ObjectCreationCondition>),

    /// Any condition must be true (OR)
    Any(Vec<ObjectCreationCondition>),

    /// Condition must be false (NOT)
    Not(Box<ObjectCreationCondition>),
}

impl ObjectCreationCondition {
    fn argument<'a, L: Language>(ctx: &NodeContext<'a, L>, index: usize) -> Option<Argument<'a>> {
        ctx.language()
            .object_creation_arguments(ctx.node(), ctx.model())?
            .into_iter()
            .nth(index)
    }
}

impl Condition for ObjectCreationCondition {
    fn evaluate<L: Language>(&self, ctx: &NodeContext<'_, L>) -> bool {
        let language = ctx.language();
        let model = ctx.model();

        match self {
            ObjectCreationCondition::MatchConstructor(owner) => language
                .symbol(ctx.node(), model)
                .is_some_and(|s| s.kind == SymbolKind::Constructor && s.is_member_of(*owner)),

            ObjectCreationCondition::ArgumentAtIndexIs(index, expected) => {
                Self::argument(ctx, *index).is_some_and(|arg| {
                    language
                        .type_of(arg.expression, model)
                        .is_some_and(|t| expected.matches(t))
                })
            }

            ObjectCreationCondition::ArgumentAtIndexIsConst(index) => {
                Self::argument(ctx, *index).is_some_and(|arg| arg.is_constant)
            }

            ObjectCreationCondition::All(conditions) => conditions.iter().all(|c| c.evaluate(ctx)),

            ObjectCreationCondition::Any(conditions) => conditions.iter().any(|c| c.evaluate(ctx)),

            ObjectCreationCondition::Not(condition) => !condition.evaluate(ctx),
        }
    }
}

/// Tracks object instantiation sites
pub struct ObjectCreationTracker;

impl ObjectCreationTracker {
    pub fn track<L: Language>(
        registry: &mut RuleRegistry<L>,
        descriptor: &'static RuleDescriptor,
        message_args: &[&str],
        conditions: Vec<ObjectCreationCondition>,
    ) {
        let kinds = registry.language().object_creation_kinds();
        super::track(registry, kinds, descriptor, message_args, conditions);
    }
}

#[cfg(test)]
mod tests {
    use super::ObjectCreationCondition::*;
    use super::*;
    use crate::diagnostic::Severity;
    use crate::language::CSharp;
    use crate::rule::RuleCategory;
    use crate::trackers::test_support::network_credential;

    static RULE: RuleDescriptor = RuleDescriptor {
        id: "T100",
        title: "Tracked creation",
        message_format: "{0}",
        severity: Severity::Warning,
        category: RuleCategory::Security,
        enabled_by_default: true,
        description: "",
        parameters: &[],
    };

    fn run(literal: bool, conditions: Vec<ObjectCreationCondition>) -> usize {
        let (unit, _) = network_credential(literal);
        let mut registry = RuleRegistry::new(CSharp);
        ObjectCreationTracker::track(&mut registry, &RULE, &["hit"], conditions);
        registry.analyze(&unit).len()
    }

    #[test]
    fn test_match_constructor() {
        assert_eq!(run(true, vec![MatchConstructor(KnownType::NETWORK_CREDENTIAL)]), 1);
        assert_eq!(run(true, vec![MatchConstructor(KnownType::PASSWORD_DERIVE_BYTES)]), 0);
    }

    #[test]
    fn test_argument_type_and_constness() {
        let conditions = vec![
            MatchConstructor(KnownType::NETWORK_CREDENTIAL),
            ArgumentAtIndexIs(1, KnownType::SYSTEM_STRING),
            ArgumentAtIndexIsConst(1),
        ];
        assert_eq!(run(true, conditions.clone()), 1);
        // a string variable has the right type but no constant value
        assert_eq!(run(false, conditions), 0);
        assert_eq!(run(false, vec![ArgumentAtIndexIs(1, KnownType::SYSTEM_STRING)]), 1);
    }

    #[test]
    fn test_argument_index_is_bounds_checked() {
        assert_eq!(run(true, vec![ArgumentAtIndexIsConst(2)]), 0);
        assert_eq!(run(true, vec![ArgumentAtIndexIs(5, KnownType::SYSTEM_STRING)]), 0);
        assert_eq!(run(true, vec![ArgumentAtIndexIsConst(0)]), 1);
    }

    #[test]
    fn test_combinators() {
        assert_eq!(
            run(
                true,
                vec![Any(vec![
                    MatchConstructor(KnownType::PASSWORD_DERIVE_BYTES),
                    MatchConstructor(KnownType::NETWORK_CREDENTIAL),
                ])]
            ),
            1
        );
        assert_eq!(
            run(
                true,
                vec![All(vec![
                    MatchConstructor(KnownType::NETWORK_CREDENTIAL),
                    Not(Box::new(ArgumentAtIndexIsConst(1))),
                ])]
            ),
            0
        );
    }

    #[test]
    fn test_empty_condition_list_matches_every_creation() {
        assert_eq!(run(true, Vec::new()), 1);
    }

    #[test]
    fn test_separate_registrations_report_independently() {
        let (unit, _) = network_credential(true);
        let mut registry = RuleRegistry::new(CSharp);
        ObjectCreationTracker::track(&mut registry, &RULE, &["first"], vec![]);
        ObjectCreationTracker::track(
            &mut registry,
            &RULE,
            &["second"],
            vec![MatchConstructor(KnownType::NETWORK_CREDENTIAL)],
        );
        let messages: Vec<_> = registry
            .analyze(&unit)
            .into_iter()
            .map(|d| d.message)
            .collect();
        assert_eq!(messages, vec!["first", "second"]);
    }
}
