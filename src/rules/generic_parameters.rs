//! S2436: too many generic parameters

use crate::diagnostic::Severity;
use crate::language::{CSharp, CSharpKind, Language};
use crate::rule::{ParameterKind, Rule, RuleCategory, RuleDescriptor, RuleParameter, RuleRegistry};
use crate::syntax::{KindSet, Node};

pub const DEFAULT_MAX_IN_CLASS: usize = 2;
pub const DEFAULT_MAX_IN_METHOD: usize = 3;

pub static DESCRIPTOR: RuleDescriptor = RuleDescriptor {
    id: "S2436",
    title: "Types and methods should not have too many generic parameters",
    message_format: "Reduce the number of generic parameters in the '{0}' {1} to no more than the {2} authorized.",
    severity: Severity::Warning,
    category: RuleCategory::Maintainability,
    enabled_by_default: false,
    description: "Every extra type parameter multiplies the combinations a reader and a \
                  caller have to keep in mind.",
    parameters: &[
        RuleParameter {
            key: "maxGenericParametersInClass",
            kind: ParameterKind::Integer,
            description: "Maximum authorized number of generic parameters.",
            default: "2",
        },
        RuleParameter {
            key: "maxGenericParametersInMethod",
            kind: ParameterKind::Integer,
            description: "Maximum authorized number of generic parameters for methods.",
            default: "3",
        },
    ],
};

const TYPE_DECLARATIONS: KindSet<CSharpKind> = KindSet::new(&[
    CSharpKind::ClassDeclaration,
    CSharpKind::StructDeclaration,
    CSharpKind::InterfaceDeclaration,
    CSharpKind::RecordDeclaration,
    CSharpKind::RecordStructDeclaration,
]);

const METHOD_DECLARATIONS: KindSet<CSharpKind> =
    KindSet::new(&[CSharpKind::MethodDeclaration, CSharpKind::LocalFunctionStatement]);

/// Declarations that can enclose a method
const ENCLOSING_TYPES: KindSet<CSharpKind> = KindSet::new(&[
    CSharpKind::ClassDeclaration,
    CSharpKind::StructDeclaration,
    CSharpKind::InterfaceDeclaration,
    CSharpKind::RecordDeclaration,
    CSharpKind::RecordStructDeclaration,
    CSharpKind::EnumDeclaration,
]);

/// Too many generic parameters (S2436)
#[derive(Debug, Clone, Copy)]
pub struct TooManyGenericParameters {
    pub max_in_class: usize,
    pub max_in_method: usize,
}

impl Default for TooManyGenericParameters {
    fn default() -> Self {
        Self {
            max_in_class: DEFAULT_MAX_IN_CLASS,
            max_in_method: DEFAULT_MAX_IN_METHOD,
        }
    }
}

fn type_parameter_count(declaration: Node<'_>) -> usize {
    declaration
        .first_child_of_kind("TypeParameterList")
        .map_or(0, |list| {
            list.child_nodes()
                .filter(|n| n.kind() == "TypeParameter")
                .count()
        })
}

/// Keyword naming the declaration in messages
fn declaration_type_name(kind: CSharpKind) -> &'static str {
    match kind {
        CSharpKind::StructDeclaration => "struct",
        CSharpKind::InterfaceDeclaration => "interface",
        CSharpKind::RecordDeclaration => "record",
        CSharpKind::RecordStructDeclaration => "record struct",
        _ => "class",
    }
}

/// `Type.Method`, or just the method name outside any type
fn qualified_method_name(language: &CSharp, method: Node<'_>, name: &str) -> String {
    let enclosing = method
        .ancestors()
        .find(|a| language.is_any_kind(*a, ENCLOSING_TYPES))
        .and_then(|t| language.identifier_text(t));

    [enclosing.unwrap_or(""), name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(".")
}

impl Rule<CSharp> for TooManyGenericParameters {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &DESCRIPTOR
    }

    fn initialize(&self, registry: &mut RuleRegistry<CSharp>) {
        let max = self.max_in_class;
        registry.register_node_action(&DESCRIPTOR, TYPE_DECLARATIONS, move |ctx| {
            if ctx.is_redundant_positional_record_context() {
                return;
            }
            let language = ctx.language();
            let declaration = ctx.node();
            if type_parameter_count(declaration) <= max {
                return;
            }
            let (Some(kind), Some(identifier)) =
                (language.kind(declaration), language.node_identifier(declaration))
            else {
                return;
            };

            let name = language.identifier_value(identifier.text()).to_string();
            ctx.report(
                &DESCRIPTOR,
                identifier,
                &[name, declaration_type_name(kind).to_string(), max.to_string()],
            );
        });

        let max = self.max_in_method;
        registry.register_node_action(&DESCRIPTOR, METHOD_DECLARATIONS, move |ctx| {
            let language = ctx.language();
            let method = ctx.node();
            if type_parameter_count(method) <= max {
                return;
            }
            let Some(identifier) = language.node_identifier(method) else {
                return;
            };

            let name = qualified_method_name(
                language,
                method,
                language.identifier_value(identifier.text()),
            );
            ctx.report(
                &DESCRIPTOR,
                identifier,
                &[name, "method".to_string(), max.to_string()],
            );
        });
    }
}
