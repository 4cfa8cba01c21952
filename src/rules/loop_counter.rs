//! S127: `for` loop counters updated in the loop body

use crate::diagnostic::Severity;
use crate::language::{CSharp, CSharpKind, Language};
use crate::rule::{Rule, RuleCategory, RuleDescriptor, RuleRegistry};
use crate::semantic::{SemanticModel, SymbolId};
use crate::syntax::{KindSet, Node};

pub static DESCRIPTOR: RuleDescriptor = RuleDescriptor {
    id: "S127",
    title: "\"for\" loop stop conditions should be invariant",
    message_format: "Do not update the loop counter '{0}' within the loop body.",
    severity: Severity::Warning,
    category: RuleCategory::Suspicious,
    enabled_by_default: true,
    description: "A loop counter that is also updated inside the body makes the number \
                  of iterations hard to predict. Use a while loop or move the update \
                  into the loop header.",
    parameters: &[],
};

/// Which expressions a side-effecting node mutates
#[derive(Debug, Clone, Copy)]
enum Affected {
    Operand,
    AssignmentTargets,
}

const SIDE_EFFECTS: &[(KindSet<CSharpKind>, Affected)] = &[
    (
        KindSet::new(&[CSharpKind::PreIncrementExpression, CSharpKind::PreDecrementExpression]),
        Affected::Operand,
    ),
    (
        KindSet::new(&[CSharpKind::PostIncrementExpression, CSharpKind::PostDecrementExpression]),
        Affected::Operand,
    ),
    (
        KindSet::new(&[
            CSharpKind::SimpleAssignmentExpression,
            CSharpKind::AddAssignmentExpression,
            CSharpKind::SubtractAssignmentExpression,
            CSharpKind::MultiplyAssignmentExpression,
            CSharpKind::DivideAssignmentExpression,
            CSharpKind::ModuloAssignmentExpression,
            CSharpKind::AndAssignmentExpression,
            CSharpKind::ExclusiveOrAssignmentExpression,
            CSharpKind::OrAssignmentExpression,
            CSharpKind::LeftShiftAssignmentExpression,
            CSharpKind::RightShiftAssignmentExpression,
        ]),
        Affected::AssignmentTargets,
    ),
];

const FOR_STATEMENT: KindSet<CSharpKind> = KindSet::new(&[CSharpKind::ForStatement]);

/// Loop counter updated in the body (S127)
pub struct LoopCounterChanged;

impl LoopCounterChanged {
    /// Symbols declared or simply assigned in the loop header
    fn counters(language: &CSharp, for_node: Node<'_>, model: &dyn SemanticModel) -> Vec<SymbolId> {
        let mut counters = Vec::new();

        let declaration = for_node
            .child_by_role("declaration")
            .or_else(|| for_node.first_child_of_kind("VariableDeclaration"));
        if let Some(declaration) = declaration {
            counters.extend(
                declaration
                    .child_nodes()
                    .filter(|n| n.kind() == "VariableDeclarator")
                    .filter_map(|declarator| model.declared_symbol(declarator))
                    .map(|symbol| symbol.id),
            );
        }

        for initializer in header_initializers(for_node) {
            if language.kind(initializer) != Some(CSharpKind::SimpleAssignmentExpression) {
                continue;
            }
            let symbol = language
                .assignment_left(initializer)
                .and_then(|left| language.symbol(left, model));
            if let Some(symbol) = symbol {
                if !counters.contains(&symbol.id) {
                    counters.push(symbol.id);
                }
            }
        }

        counters
    }

    /// Expressions mutated anywhere in `body`
    fn affected_expressions<'a>(language: &CSharp, body: Node<'a>) -> Vec<Node<'a>> {
        let mut affected = Vec::new();
        for node in body.descendants_and_self() {
            for (kinds, effect) in SIDE_EFFECTS {
                if !language.is_any_kind(node, *kinds) {
                    continue;
                }
                match effect {
                    Affected::Operand => affected.extend(node.child_nodes().next()),
                    Affected::AssignmentTargets => affected.extend(language.assignment_targets(node)),
                }
            }
        }
        affected
    }
}

/// Initializer expressions of a `for` header
///
/// Without role tags these are the expression nodes before the first `;`.
fn header_initializers(for_node: Node<'_>) -> Vec<Node<'_>> {
    let tagged: Vec<Node<'_>> = for_node.children_by_role("initializer").collect();
    if !tagged.is_empty() {
        return tagged;
    }
    for_node
        .children()
        .take_while(|n| n.kind() != "SemicolonToken")
        .filter(|n| n.kind() == "SimpleAssignmentExpression")
        .collect()
}

/// Body statement of a `for` loop
fn loop_body(for_node: Node<'_>) -> Option<Node<'_>> {
    for_node
        .child_by_role("statement")
        .or_else(|| for_node.child_nodes().last())
}

impl Rule<CSharp> for LoopCounterChanged {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &DESCRIPTOR
    }

    fn initialize(&self, registry: &mut RuleRegistry<CSharp>) {
        registry.register_node_action(&DESCRIPTOR, FOR_STATEMENT, |ctx| {
            let language = ctx.language();
            let model = ctx.model();
            let for_node = ctx.node();

            let counters = Self::counters(language, for_node, model);
            if counters.is_empty() {
                return;
            }
            let Some(body) = loop_body(for_node) else {
                return;
            };

            for target in Self::affected_expressions(language, body) {
                let Some(symbol) = language.symbol(target, model) else {
                    continue;
                };
                if counters.contains(&symbol.id) {
                    ctx.report(&DESCRIPTOR, target, &[symbol.name.clone()]);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::{Symbol, SymbolKind};
    use crate::source::{LanguageId, SourceUnit};
    use crate::syntax::{NodeId, SourceBuilder};
    use pretty_assertions::assert_eq;

    struct Fixture {
        builder: SourceBuilder,
        i: SymbolId,
        j: SymbolId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut builder = SourceBuilder::new("Loop.cs", LanguageId::CSharp);
            let i = builder.add_symbol(Symbol::new(SymbolKind::Local, "i").with_type("System.Int32"));
            let j = builder.add_symbol(Symbol::new(SymbolKind::Local, "j").with_type("System.Int32"));
            Self { builder, i, j }
        }

        fn name(&mut self, text: &str, symbol: SymbolId) -> NodeId {
            let b = &mut self.builder;
            let id = b.start_node("IdentifierName");
            b.token("IdentifierToken", text);
            b.finish_node();
            b.bind(id, symbol);
            id
        }

        fn number(&mut self, text: &str) {
            let b = &mut self.builder;
            b.start_node("NumericLiteralExpression");
            b.token("NumericLiteralToken", text);
            b.finish_node();
        }

        /// `<name> <op> <value>;` as an expression statement
        fn assignment_statement(&mut self, kind: &str, op: &str, name: &str, symbol: SymbolId) {
            self.builder.start_node("ExpressionStatement");
            self.builder.start_node(kind);
            self.name(name, symbol);
            self.builder.token(op, "=");
            self.number("5");
            self.builder.finish_node();
            self.builder.token("SemicolonToken", ";");
            self.builder.finish_node();
        }

        /// `for (int i = 0; i < 10; i++)` header, leaving the body open for the caller
        fn declared_header(&mut self) {
            let i = self.i;
            let b = &mut self.builder;
            b.start_node("ForStatement");
            b.token("ForKeyword", "for");
            b.token("OpenParenToken", "(");
            b.start_node_as("declaration", "VariableDeclaration");
            b.start_node("PredefinedType");
            b.token("IntKeyword", "int");
            b.finish_node();
            let declarator = b.start_node("VariableDeclarator");
            b.token("IdentifierToken", "i");
            b.start_node("EqualsValueClause");
            b.token("EqualsToken", "=");
            b.finish_node();
            b.finish_node();
            b.declare(declarator, i);
            b.finish_node();
            b.token("SemicolonToken", ";");
            b.start_node_as("condition", "LessThanExpression");
            self.name("i", i);
            self.builder.token("LessThanToken", "<");
            self.number("10");
            self.builder.finish_node();
            self.builder.token("SemicolonToken", ";");
            self.builder.start_node_as("incrementor", "PostIncrementExpression");
            self.name("i", i);
            self.builder.token("PlusPlusToken", "++");
            self.builder.finish_node();
            self.builder.token("CloseParenToken", ")");
        }

        fn finish(mut self) -> SourceUnit {
            self.builder.finish_node();
            self.builder.finish().unwrap()
        }
    }

    fn analyze(unit: &SourceUnit) -> Vec<(String, usize)> {
        let mut registry = RuleRegistry::new(CSharp);
        registry.add_rule(&LoopCounterChanged);
        registry
            .analyze(unit)
            .into_iter()
            .map(|d| (d.message, d.location.column))
            .collect()
    }

    #[test]
    fn test_assignment_in_body_is_reported() {
        let mut f = Fixture::new();
        f.declared_header();
        let i = f.i;
        f.builder.start_node_as("statement", "Block");
        f.builder.token("OpenBraceToken", "{");
        f.assignment_statement("SimpleAssignmentExpression", "EqualsToken", "i", i);
        f.builder.token("CloseBraceToken", "}");
        f.builder.finish_node();
        let unit = f.finish();

        let found = analyze(&unit);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "Do not update the loop counter 'i' within the loop body.");
    }

    #[test]
    fn test_header_incrementor_is_not_reported() {
        let mut f = Fixture::new();
        f.declared_header();
        f.builder.start_node_as("statement", "Block");
        f.builder.token("OpenBraceToken", "{");
        f.builder.token("CloseBraceToken", "}");
        f.builder.finish_node();
        let unit = f.finish();

        assert!(analyze(&unit).is_empty());
    }

    #[test]
    fn test_other_variables_and_compound_updates() {
        let mut f = Fixture::new();
        f.declared_header();
        let (i, j) = (f.i, f.j);
        f.builder.start_node_as("statement", "Block");
        f.builder.token("OpenBraceToken", "{");
        f.assignment_statement("AddAssignmentExpression", "PlusEqualsToken", "j", j);
        f.assignment_statement("MultiplyAssignmentExpression", "AsteriskEqualsToken", "i", i);
        f.builder.start_node("ExpressionStatement");
        f.builder.start_node("PreDecrementExpression");
        f.builder.token("MinusMinusToken", "--");
        f.name("i", i);
        f.builder.finish_node();
        f.builder.token("SemicolonToken", ";");
        f.builder.finish_node();
        f.builder.token("CloseBraceToken", "}");
        f.builder.finish_node();
        let unit = f.finish();

        let messages: Vec<_> = analyze(&unit).into_iter().map(|(m, _)| m).collect();
        assert_eq!(
            messages,
            vec![
                "Do not update the loop counter 'i' within the loop body.",
                "Do not update the loop counter 'i' within the loop body.",
            ]
        );
    }

    /// `for (j = 0; ; ) j = 5;` with a single statement body
    #[test]
    fn test_initializer_assignment_counts_as_counter() {
        let mut f = Fixture::new();
        let j = f.j;
        f.builder.start_node("ForStatement");
        f.builder.token("ForKeyword", "for");
        f.builder.token("OpenParenToken", "(");
        f.builder.start_node_as("initializer", "SimpleAssignmentExpression");
        f.name("j", j);
        f.builder.token("EqualsToken", "=");
        f.number("0");
        f.builder.finish_node();
        f.builder.token("SemicolonToken", ";");
        f.builder.token("SemicolonToken", ";");
        f.builder.token("CloseParenToken", ")");
        f.builder.start_node_as("statement", "ExpressionStatement");
        f.builder.start_node("SimpleAssignmentExpression");
        f.name("j", j);
        f.builder.token("EqualsToken", "=");
        f.number("5");
        f.builder.finish_node();
        f.builder.token("SemicolonToken", ";");
        f.builder.finish_node();
        let unit = f.finish();

        let found = analyze(&unit);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "Do not update the loop counter 'j' within the loop body.");
    }

    #[test]
    fn test_initializer_without_roles_counts_as_counter() {
        let mut f = Fixture::new();
        let j = f.j;
        f.builder.start_node("ForStatement");
        f.builder.token("ForKeyword", "for");
        f.builder.token("OpenParenToken", "(");
        f.builder.start_node("SimpleAssignmentExpression");
        f.name("j", j);
        f.builder.token("EqualsToken", "=");
        f.number("0");
        f.builder.finish_node();
        f.builder.token("SemicolonToken", ";");
        f.builder.token("SemicolonToken", ";");
        f.builder.token("CloseParenToken", ")");
        f.builder.start_node("ExpressionStatement");
        f.builder.start_node("SimpleAssignmentExpression");
        f.name("j", j);
        f.builder.token("EqualsToken", "=");
        f.number("5");
        f.builder.finish_node();
        f.builder.token("SemicolonToken", ";");
        f.builder.finish_node();
        let unit = f.finish();

        let found = analyze(&unit);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "Do not update the loop counter 'j' within the loop body.");
    }

    #[test]
    fn test_loop_without_counters_is_ignored() {
        let mut f = Fixture::new();
        let i = f.i;
        f.builder.start_node("ForStatement");
        f.builder.token("ForKeyword", "for");
        f.builder.token("OpenParenToken", "(");
        f.builder.token("SemicolonToken", ";");
        f.builder.token("SemicolonToken", ";");
        f.builder.token("CloseParenToken", ")");
        f.builder.start_node_as("statement", "Block");
        f.builder.token("OpenBraceToken", "{");
        f.assignment_statement("SimpleAssignmentExpression", "EqualsToken", "i", i);
        f.builder.token("CloseBraceToken", "}");
        f.builder.finish_node();
        let unit = f.finish();

        assert!(analyze(&unit).is_empty());
    }
}
