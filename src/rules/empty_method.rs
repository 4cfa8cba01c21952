//! S1186: methods should not be empty

use crate::diagnostic::Severity;
use crate::language::{CSharp, CSharpKind, Language};
use crate::rule::{NodeContext, Rule, RuleCategory, RuleDescriptor, RuleRegistry};
use crate::syntax::{KindSet, Node};

pub static DESCRIPTOR: RuleDescriptor = RuleDescriptor {
    id: "S1186",
    title: "Methods should not be empty",
    message_format: "Add a nested comment explaining why this method is empty, throw a \
                     'NotSupportedException' or complete the implementation.",
    severity: Severity::Warning,
    category: RuleCategory::Suspicious,
    enabled_by_default: true,
    description: "An empty method is either unfinished or intentionally a no-op; a \
                  comment inside the body tells the reader which.",
    parameters: &[],
};

const METHODS: KindSet<CSharpKind> =
    KindSet::new(&[CSharpKind::MethodDeclaration, CSharpKind::LocalFunctionStatement]);

/// Empty method bodies (S1186)
pub struct EmptyMethod;

/// A block with no statements and no comment inside its braces
fn is_empty_block(language: &CSharp, block: Node<'_>) -> bool {
    block.child_nodes().next().is_none() && !language.body_delimiters_have_comments(block)
}

/// Virtual methods, overrides of abstract members, and overrides in test projects
fn is_excluded(ctx: &NodeContext<'_, CSharp>, method: Node<'_>) -> bool {
    let language = ctx.language();
    if language.has_modifier(method, CSharpKind::VirtualKeyword) {
        return true;
    }

    let model = ctx.model();
    let overrides_abstract = model.declared_symbol(method).is_some_and(|symbol| {
        symbol.is_override
            && symbol
                .overridden
                .and_then(|id| model.symbol(id))
                .is_some_and(|overridden| overridden.is_abstract)
    });
    if overrides_abstract {
        return true;
    }

    language.has_modifier(method, CSharpKind::OverrideKeyword) && ctx.is_test_project()
}

impl Rule<CSharp> for EmptyMethod {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &DESCRIPTOR
    }

    fn initialize(&self, registry: &mut RuleRegistry<CSharp>) {
        registry.register_node_action(&DESCRIPTOR, METHODS, |ctx| {
            let language = ctx.language();
            let method = ctx.node();

            // expression-bodied members have no block and are never empty
            let Some(body) = method.first_child_of_kind("Block") else {
                return;
            };
            if !is_empty_block(language, body) {
                return;
            }
            let is_local_function = language.kind(method) == Some(CSharpKind::LocalFunctionStatement);
            if !is_local_function && is_excluded(ctx, method) {
                return;
            }

            if let Some(identifier) = language.node_identifier(method) {
                ctx.report(&DESCRIPTOR, identifier, &[]);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::{Symbol, SymbolKind};
    use crate::source::{LanguageId, SourceUnit};
    use crate::syntax::{SourceBuilder, TriviaKind};

    #[derive(Default)]
    struct Method<'a> {
        modifiers: &'a [(&'a str, &'a str)],
        statement: bool,
        open_comment: Option<TriviaKind>,
        close_comment: Option<TriviaKind>,
        overrides_abstract: bool,
        test_project: bool,
    }

    /// `<modifiers> void Run() { <comment> <statement> }`
    fn method(shape: Method<'_>) -> SourceUnit {
        let mut b = SourceBuilder::new("Service.cs", LanguageId::CSharp).test_project(shape.test_project);
        let base = b.add_symbol(Symbol::new(SymbolKind::Method, "Run").with_abstract());
        let symbol = Symbol::new(SymbolKind::Method, "Run").with_containing_type("Service");
        let symbol = if shape.overrides_abstract {
            b.add_symbol(symbol.with_override(Some(base)))
        } else {
            b.add_symbol(symbol)
        };

        let declaration = b.start_node("MethodDeclaration");
        for (kind, text) in shape.modifiers {
            b.token(kind, text);
        }
        b.start_node("PredefinedType");
        b.token("VoidKeyword", "void");
        b.finish_node();
        b.token("IdentifierToken", "Run");
        b.start_node("ParameterList");
        b.token("OpenParenToken", "(");
        b.token("CloseParenToken", ")");
        b.finish_node();
        b.start_node("Block");
        b.token("OpenBraceToken", "{");
        if let Some(kind) = shape.open_comment {
            b.trailing_trivia(kind, "// nothing to do");
        }
        if shape.statement {
            b.start_node("ReturnStatement");
            b.token("ReturnKeyword", "return");
            b.token("SemicolonToken", ";");
            b.finish_node();
        }
        if let Some(kind) = shape.close_comment {
            b.leading_trivia(kind, "/* intentionally blank */");
        }
        b.token("CloseBraceToken", "}");
        b.finish_node();
        b.finish_node();
        b.declare(declaration, symbol);
        b.finish().unwrap()
    }

    fn count(unit: &SourceUnit) -> usize {
        let mut registry = RuleRegistry::new(CSharp);
        registry.add_rule(&EmptyMethod);
        registry.analyze(unit).len()
    }

    #[test]
    fn test_empty_method_is_reported_at_identifier() {
        let unit = method(Method::default());
        let mut registry = RuleRegistry::new(CSharp);
        registry.add_rule(&EmptyMethod);
        let diagnostics = registry.analyze(&unit);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule_id, "S1186");
        // `void Run`: the identifier follows the return type
        assert_eq!(diagnostics[0].location.column, 6);
        assert!(diagnostics[0].message.starts_with("Add a nested comment"));
    }

    #[test]
    fn test_statements_or_comments_make_the_method_non_empty() {
        assert_eq!(count(&method(Method { statement: true, ..Method::default() })), 0);
        assert_eq!(
            count(&method(Method {
                open_comment: Some(TriviaKind::SingleLineComment),
                ..Method::default()
            })),
            0
        );
        assert_eq!(
            count(&method(Method {
                close_comment: Some(TriviaKind::MultiLineComment),
                ..Method::default()
            })),
            0
        );
    }

    #[test]
    fn test_documentation_comment_does_not_count() {
        let unit = method(Method {
            open_comment: Some(TriviaKind::DocumentationComment),
            ..Method::default()
        });
        assert_eq!(count(&unit), 1);
    }

    #[test]
    fn test_virtual_method_is_excluded() {
        let unit = method(Method {
            modifiers: &[("PublicKeyword", "public"), ("VirtualKeyword", "virtual")],
            ..Method::default()
        });
        assert_eq!(count(&unit), 0);
    }

    #[test]
    fn test_override_exclusions() {
        let overrides: &[(&str, &str)] = &[("OverrideKeyword", "override")];
        assert_eq!(
            count(&method(Method {
                modifiers: overrides,
                overrides_abstract: true,
                ..Method::default()
            })),
            0
        );
        assert_eq!(
            count(&method(Method {
                modifiers: overrides,
                test_project: true,
                ..Method::default()
            })),
            0
        );
        assert_eq!(
            count(&method(Method {
                modifiers: overrides,
                ..Method::default()
            })),
            1
        );
    }

    #[test]
    fn test_local_function_ignores_method_exclusions() {
        let mut b = SourceBuilder::new("Local.cs", LanguageId::CSharp);
        b.start_node("LocalFunctionStatement");
        b.token("VirtualKeyword", "virtual");
        b.start_node("PredefinedType");
        b.token("VoidKeyword", "void");
        b.finish_node();
        b.token("IdentifierToken", "Helper");
        b.start_node("Block");
        b.token("OpenBraceToken", "{");
        b.token("CloseBraceToken", "}");
        b.finish_node();
        b.finish_node();
        let unit = b.finish().unwrap();

        assert_eq!(count(&unit), 1);
    }

    #[test]
    fn test_expression_bodied_method_is_ignored() {
        let mut b = SourceBuilder::new("Arrow.cs", LanguageId::CSharp);
        b.start_node("MethodDeclaration");
        b.token("IdentifierToken", "Value");
        b.start_node("ArrowExpressionClause");
        b.token("EqualsGreaterThanToken", "=>");
        b.start_node("NumericLiteralExpression");
        b.token("NumericLiteralToken", "1");
        b.finish_node();
        b.finish_node();
        b.finish_node();
        let unit = b.finish().unwrap();

        assert_eq!(count(&unit), 0);
    }
}
