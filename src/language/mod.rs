//! Syntax abstraction layer
//!
//! Rules never look at grammar-specific node shapes directly. Each grammar
//! implements [`Language`] by describing its kinds as static [`KindSet`]
//! tables; the shared queries (argument lists, assignment targets, literal
//! values, delimiter comments) are written once against those tables.
//!
//! ```text
//! Rule -> Language::{assignment_targets, object_creation_arguments, ...}
//!             |                     |
//!         CSharp tables      VisualBasic tables
//! ```

mod csharp;
mod visual_basic;

pub use csharp::{CSharp, CSharpKind};
pub use visual_basic::{VisualBasic, VisualBasicKind};

use crate::semantic::{ConstantValue, KnownType, SemanticModel, Symbol};
use crate::source::LanguageId;
use crate::syntax::{KindSet, Node, SyntaxKind, Trivia, TriviaKind};

/// How a grammar compares identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameComparison {
    /// Ordinal comparison
    CaseSensitive,
    /// Ordinal comparison ignoring case
    CaseInsensitive,
}

impl NameComparison {
    pub fn equals(self, a: &str, b: &str) -> bool {
        match self {
            NameComparison::CaseSensitive => a == b,
            NameComparison::CaseInsensitive => a
                .chars()
                .flat_map(char::to_lowercase)
                .eq(b.chars().flat_map(char::to_lowercase)),
        }
    }
}

/// One argument of an invocation or object creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argument<'a> {
    pub expression: Node<'a>,
    pub is_constant: bool,
}

/// Grammar capability set used by rules and trackers
pub trait Language: Default + Clone + Send + Sync + 'static {
    type Kind: SyntaxKind;

    fn id(&self) -> LanguageId;

    fn name_comparison(&self) -> NameComparison;

    // Kind tables

    fn identifier_token_kinds(&self) -> KindSet<Self::Kind>;

    /// Simple names referring to a symbol (`IdentifierName`)
    fn identifier_name_kinds(&self) -> KindSet<Self::Kind>;

    /// Member access; the accessed name is the last child node
    fn member_access_kinds(&self) -> KindSet<Self::Kind>;

    fn parenthesized_kinds(&self) -> KindSet<Self::Kind>;

    fn object_creation_kinds(&self) -> KindSet<Self::Kind>;

    fn argument_list_kinds(&self) -> KindSet<Self::Kind>;

    fn argument_kinds(&self) -> KindSet<Self::Kind>;

    fn simple_assignment_kinds(&self) -> KindSet<Self::Kind>;

    /// Simple and compound assignments
    fn assignment_kinds(&self) -> KindSet<Self::Kind>;

    fn tuple_kinds(&self) -> KindSet<Self::Kind>;

    /// Declaration patterns that introduce variables on the left of an assignment
    fn declaration_pattern_kinds(&self) -> KindSet<Self::Kind>;

    /// Single variables introduced by a declaration pattern
    fn variable_designation_kinds(&self) -> KindSet<Self::Kind>;

    fn string_literal_kinds(&self) -> KindSet<Self::Kind>;

    /// Every literal kind with a compile-time value
    fn constant_literal_kinds(&self) -> KindSet<Self::Kind>;

    /// Intrinsic type of literal kinds
    fn literal_types(&self) -> &'static [(Self::Kind, KnownType)];

    /// Value of a string literal token, with the grammar's escaping removed
    fn unquote_string(&self, text: &str) -> Option<String>;

    /// Identifier value without escaping decorations
    fn identifier_value<'a>(&self, text: &'a str) -> &'a str {
        text
    }

    // Queries

    fn kind(&self, node: Node<'_>) -> Option<Self::Kind> {
        Self::Kind::from_raw(node.kind())
    }

    fn is_any_kind(&self, node: Node<'_>, kinds: KindSet<Self::Kind>) -> bool {
        self.kind(node).is_some_and(|k| kinds.contains(k))
    }

    fn remove_parentheses<'a>(&self, node: Node<'a>) -> Node<'a> {
        let mut current = node;
        while self.is_any_kind(current, self.parenthesized_kinds()) {
            match current.child_nodes().next() {
                Some(inner) => current = inner,
                None => break,
            }
        }
        current
    }

    /// Identifier token naming a declaration, a name, or a member access
    fn node_identifier<'a>(&self, node: Node<'a>) -> Option<Node<'a>> {
        if self.is_any_kind(node, self.identifier_token_kinds()) {
            return Some(node);
        }
        if self.is_any_kind(node, self.member_access_kinds()) {
            return node
                .child_nodes()
                .last()
                .and_then(|name| self.node_identifier(name));
        }
        node.children()
            .find(|c| self.is_any_kind(*c, self.identifier_token_kinds()))
    }

    /// Textual name of an identifier-like node
    fn identifier_text<'a>(&self, node: Node<'a>) -> Option<&'a str> {
        self.node_identifier(node)
            .map(|token| self.identifier_value(token.text()))
    }

    fn argument_expression<'a>(&self, argument: Node<'a>) -> Option<Node<'a>> {
        argument
            .child_by_role("expression")
            .or_else(|| argument.child_nodes().last())
    }

    /// Ordered arguments of an object creation; `None` without an argument list
    fn object_creation_arguments<'a>(
        &self,
        node: Node<'a>,
        model: &dyn SemanticModel,
    ) -> Option<Vec<Argument<'a>>> {
        if !self.is_any_kind(node, self.object_creation_kinds()) {
            return None;
        }
        let list = node
            .children()
            .find(|c| self.is_any_kind(*c, self.argument_list_kinds()))?;

        Some(
            list.child_nodes()
                .filter(|c| self.is_any_kind(*c, self.argument_kinds()))
                .filter_map(|arg| self.argument_expression(arg))
                .map(|expression| Argument {
                    expression,
                    is_constant: self.is_constant(expression, model),
                })
                .collect(),
        )
    }

    fn assignment_left<'a>(&self, node: Node<'a>) -> Option<Node<'a>> {
        if !self.is_any_kind(node, self.assignment_kinds()) {
            return None;
        }
        node.child_by_role("left")
            .or_else(|| node.child_nodes().next())
    }

    fn assignment_right<'a>(&self, node: Node<'a>) -> Option<Node<'a>> {
        if !self.is_any_kind(node, self.assignment_kinds()) {
            return None;
        }
        node.child_by_role("right").or_else(|| {
            let mut nodes = node.child_nodes();
            nodes.next()?;
            nodes.last()
        })
    }

    /// Expressions mutated by an assignment, tuple and declaration targets flattened
    fn assignment_targets<'a>(&self, node: Node<'a>) -> Vec<Node<'a>> {
        let mut targets = Vec::new();
        if let Some(left) = self.assignment_left(node) {
            self.collect_targets(left, &mut targets);
        }
        targets
    }

    fn collect_targets<'a>(&self, expression: Node<'a>, targets: &mut Vec<Node<'a>>) {
        let expression = self.remove_parentheses(expression);
        if self.is_any_kind(expression, self.tuple_kinds()) {
            for argument in expression
                .child_nodes()
                .filter(|c| self.is_any_kind(*c, self.argument_kinds()))
            {
                if let Some(inner) = self.argument_expression(argument) {
                    self.collect_targets(inner, targets);
                }
            }
        } else if self.is_any_kind(expression, self.declaration_pattern_kinds()) {
            targets.extend(
                expression
                    .descendants_and_self()
                    .filter(|n| self.is_any_kind(*n, self.variable_designation_kinds())),
            );
        } else {
            targets.push(expression);
        }
    }

    /// Outermost expression whose accessed name is `node`
    fn climb_name<'a>(&self, node: Node<'a>) -> Node<'a> {
        let mut current = node;
        while let Some(parent) = current.parent() {
            let is_accessed_name = self.is_any_kind(parent, self.member_access_kinds())
                && parent.child_nodes().last() == Some(current);
            if is_accessed_name || self.is_any_kind(parent, self.parenthesized_kinds()) {
                current = parent;
            } else {
                break;
            }
        }
        current
    }

    fn is_left_side_of_assignment(&self, node: Node<'_>) -> bool {
        let top = self.climb_name(node);
        top.parent()
            .is_some_and(|parent| self.assignment_left(parent) == Some(top))
    }

    fn enclosing_simple_assignment<'a>(&self, node: Node<'a>) -> Option<Node<'a>> {
        node.ancestors()
            .find(|a| self.is_any_kind(*a, self.simple_assignment_kinds()))
    }

    /// Symbol an expression refers to, looking through parentheses and member access
    fn symbol<'m>(&self, node: Node<'_>, model: &'m dyn SemanticModel) -> Option<&'m Symbol> {
        let node = self.remove_parentheses(node);
        model.symbol_info(node).or_else(|| {
            if self.is_any_kind(node, self.member_access_kinds()) {
                node.child_nodes()
                    .last()
                    .and_then(|name| self.symbol(name, model))
            } else if self.is_any_kind(node, self.identifier_name_kinds()) {
                self.node_identifier(node)
                    .and_then(|token| model.symbol_info(token))
            } else {
                None
            }
        })
    }

    fn literal_type(&self, node: Node<'_>) -> Option<KnownType> {
        let kind = self.kind(self.remove_parentheses(node))?;
        self.literal_types()
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, t)| *t)
    }

    /// Semantic type, falling back to a literal's intrinsic type
    fn type_of<'m>(&self, node: Node<'_>, model: &'m dyn SemanticModel) -> Option<&'m str> {
        model
            .type_of(node)
            .or_else(|| self.literal_type(node).map(KnownType::full_name))
    }

    fn is_constant(&self, node: Node<'_>, model: &dyn SemanticModel) -> bool {
        let inner = self.remove_parentheses(node);
        model.constant_value(node).is_some()
            || model.constant_value(inner).is_some()
            || self.is_any_kind(inner, self.constant_literal_kinds())
    }

    fn is_string_literal(&self, node: Node<'_>) -> bool {
        self.is_any_kind(self.remove_parentheses(node), self.string_literal_kinds())
    }

    /// Value of a string constant or literal
    fn string_literal_value(&self, node: Node<'_>, model: &dyn SemanticModel) -> Option<String> {
        let inner = self.remove_parentheses(node);
        if let Some(ConstantValue::String(value)) = model
            .constant_value(node)
            .or_else(|| model.constant_value(inner))
        {
            return Some(value.clone());
        }
        if !self.is_any_kind(inner, self.string_literal_kinds()) {
            return None;
        }
        self.unquote_string(inner.first_token()?.text())
    }

    /// A record declaring a primary constructor through its parameter list
    fn is_positional_record(&self, _node: Node<'_>) -> bool {
        false
    }

    /// Direct keyword child of the given kind
    fn has_modifier(&self, node: Node<'_>, modifier: Self::Kind) -> bool {
        node.children()
            .any(|c| c.is_token() && self.kind(c) == Some(modifier))
    }

    /// Comments after the opening delimiter or before the closing delimiter of a body
    fn body_delimiters_have_comments(&self, body: Node<'_>) -> bool {
        fn is_comment(trivia: &Trivia) -> bool {
            matches!(
                trivia.kind,
                TriviaKind::SingleLineComment | TriviaKind::MultiLineComment
            )
        }

        let opening = body.children().next().and_then(|c| c.last_token());
        let closing = body.children().last().and_then(|c| c.first_token());
        opening.is_some_and(|t| t.trailing_trivia().iter().any(is_comment))
            || closing.is_some_and(|t| t.leading_trivia().iter().any(is_comment))
    }
}
