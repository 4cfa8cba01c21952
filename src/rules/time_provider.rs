//! S6354: `DateTime.Now` and friends are not testable

use crate::diagnostic::Severity;
use crate::language::Language;
use crate::rule::{Rule, RuleCategory, RuleDescriptor, RuleRegistry};
use crate::semantic::{KnownType, SymbolKind};

pub static DESCRIPTOR: RuleDescriptor = RuleDescriptor {
    id: "S6354",
    title: "Use a testable date/time provider",
    message_format: "Use a testable (date) time provider instead.",
    severity: Severity::Info,
    category: RuleCategory::Maintainability,
    enabled_by_default: true,
    description: "Code reading the system clock directly cannot be tested against a \
                  fixed point in time. Inject a clock abstraction instead.",
    parameters: &[],
};

const PROVIDER_PROPERTIES: &[&str] = &["Now", "UtcNow", "Today"];

/// Direct system clock access (S6354)
pub struct TestableTimeProvider;

impl<L: Language> Rule<L> for TestableTimeProvider {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &DESCRIPTOR
    }

    fn initialize(&self, registry: &mut RuleRegistry<L>) {
        let kinds = registry.language().identifier_name_kinds();
        registry.register_node_action(&DESCRIPTOR, kinds, |ctx| {
            let language = ctx.language();
            let node = ctx.node();
            let comparison = language.name_comparison();

            let is_provider_name = language.identifier_text(node).is_some_and(|name| {
                PROVIDER_PROPERTIES
                    .iter()
                    .any(|provider| comparison.equals(provider, name))
            });
            if !is_provider_name {
                return;
            }
            let is_date_time_property = language.symbol(node, ctx.model()).is_some_and(|symbol| {
                symbol.kind == SymbolKind::Property && symbol.is_member_of(KnownType::SYSTEM_DATE_TIME)
            });

            if is_date_time_property {
                let at = node.parent().unwrap_or(node);
                ctx.report(&DESCRIPTOR, at, &[]);
            }
        });
    }
}
