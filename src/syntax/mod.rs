//! Immutable syntax trees supplied by a compiler front-end
//!
//! Trees are stored as an arena of [`NodeData`] and inspected through the
//! copyable [`Node`] handle. Nodes carry the raw kind tag of their grammar;
//! the language adapters in [`crate::language`] turn those tags into typed
//! kinds. Tokens are ordinary leaf nodes whose kind ends in `Token` or
//! `Keyword`.

mod builder;
mod kind;

pub use builder::SourceBuilder;
pub use kind::{KindSet, SyntaxKind};
pub(crate) use kind::syntax_kinds;

use serde::{Deserialize, Serialize};

/// Index of a node inside its [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Source region, 1-based lines and columns, end exclusive
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Span {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Span {
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Smallest span covering both
    pub fn cover(self, other: Span) -> Span {
        let (start_line, start_column) =
            (self.start_line, self.start_column).min((other.start_line, other.start_column));
        let (end_line, end_column) =
            (self.end_line, self.end_column).max((other.end_line, other.end_column));
        Span {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }
}

/// Trivia category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriviaKind {
    Whitespace,
    EndOfLine,
    SingleLineComment,
    MultiLineComment,
    DocumentationComment,
    Directive,
    #[serde(other)]
    Other,
}

impl TriviaKind {
    pub fn is_comment(self) -> bool {
        matches!(
            self,
            TriviaKind::SingleLineComment
                | TriviaKind::MultiLineComment
                | TriviaKind::DocumentationComment
        )
    }
}

/// Whitespace, comments and directives attached to a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub text: String,
}

impl Trivia {
    pub fn new(kind: TriviaKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
        }
    }
}

/// Arena slot for one node
#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: String,
    pub(crate) role: Option<String>,
    pub(crate) text: Option<String>,
    pub(crate) span: Span,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) leading_trivia: Vec<Trivia>,
    pub(crate) trailing_trivia: Vec<Trivia>,
}

impl NodeData {
    pub(crate) fn new(kind: &str, role: Option<&str>, text: Option<&str>) -> Self {
        Self {
            kind: kind.to_string(),
            role: role.map(String::from),
            text: text.map(String::from),
            span: Span::default(),
            parent: None,
            children: Vec::new(),
            leading_trivia: Vec::new(),
            trailing_trivia: Vec::new(),
        }
    }
}

/// A whole parsed source file
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl SyntaxTree {
    pub(crate) fn from_parts(nodes: Vec<NodeData>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    pub fn root(&self) -> Node<'_> {
        self.node(self.root)
    }

    /// Handle for a node id; ids come from this tree
    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { tree: self, id }
    }

    pub fn get(&self, id: NodeId) -> Option<Node<'_>> {
        (id.index() < self.nodes.len()).then(|| self.node(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Copyable handle to a node of a [`SyntaxTree`]
#[derive(Clone, Copy)]
pub struct Node<'a> {
    tree: &'a SyntaxTree,
    id: NodeId,
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Node");
        s.field("id", &self.id.0).field("kind", &self.kind());
        if let Some(text) = &self.data().text {
            s.field("text", text);
        }
        s.finish()
    }
}

impl<'a> Node<'a> {
    fn data(&self) -> &'a NodeData {
        &self.tree.nodes[self.id.index()]
    }

    fn wrap(&self, id: NodeId) -> Node<'a> {
        Node {
            tree: self.tree,
            id,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    /// Raw kind tag
    pub fn kind(&self) -> &'a str {
        &self.data().kind
    }

    /// Field name of this node within its parent
    pub fn role(&self) -> Option<&'a str> {
        self.data().role.as_deref()
    }

    /// Token text; empty for interior nodes
    pub fn text(&self) -> &'a str {
        self.data().text.as_deref().unwrap_or("")
    }

    pub fn span(&self) -> Span {
        self.data().span
    }

    pub fn is_token(&self) -> bool {
        let kind = self.kind();
        kind.ends_with("Token") || kind.ends_with("Keyword")
    }

    pub fn parent(&self) -> Option<Node<'a>> {
        self.data().parent.map(|id| self.wrap(id))
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |&id| Node { tree, id })
    }

    /// Children that are not tokens
    pub fn child_nodes(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        self.children().filter(|c| !c.is_token())
    }

    pub fn child_by_role(&self, role: &str) -> Option<Node<'a>> {
        self.children().find(|c| c.role() == Some(role))
    }

    pub fn children_by_role<'r>(&self, role: &'r str) -> impl Iterator<Item = Node<'a>> + 'r
    where
        'a: 'r,
    {
        self.children().filter(move |c| c.role() == Some(role))
    }

    pub fn first_child_of_kind(&self, kind: &str) -> Option<Node<'a>> {
        self.children().find(|c| c.kind() == kind)
    }

    pub fn has_child_of_kind(&self, kind: &str) -> bool {
        self.first_child_of_kind(kind).is_some()
    }

    /// Parent chain, nearest first, excluding this node
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// This node and everything below it, in pre-order
    pub fn descendants_and_self(&self) -> Descendants<'a> {
        Descendants {
            tree: self.tree,
            stack: vec![self.id],
        }
    }

    pub fn leading_trivia(&self) -> &'a [Trivia] {
        &self.data().leading_trivia
    }

    pub fn trailing_trivia(&self) -> &'a [Trivia] {
        &self.data().trailing_trivia
    }

    /// First token at or below this node
    pub fn first_token(&self) -> Option<Node<'a>> {
        self.descendants_and_self().find(|n| n.is_token())
    }

    /// Last token at or below this node
    pub fn last_token(&self) -> Option<Node<'a>> {
        if self.is_token() {
            return Some(*self);
        }
        self.data()
            .children
            .iter()
            .rev()
            .find_map(|&id| self.wrap(id).last_token())
    }

    /// Concatenated token text below this node, single-space separated
    pub fn source_text(&self) -> String {
        self.descendants_and_self()
            .filter(|n| n.data().text.is_some())
            .map(|n| n.text())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Pre-order walk produced by [`Node::descendants_and_self`]
pub struct Descendants<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let data = &self.tree.nodes[id.index()];
        self.stack.extend(data.children.iter().rev().copied());
        Some(Node {
            tree: self.tree,
            id,
        })
    }
}
