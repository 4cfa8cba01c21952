//! Incremental construction of syntax trees and their symbol tables

use super::{NodeData, NodeId, Span, SyntaxTree, Trivia, TriviaKind};
use crate::semantic::{ConstantValue, Symbol, SymbolId, SymbolTable};
use crate::source::{LanguageId, ParseError, SourceUnit};
use std::path::PathBuf;

/// Builds a [`SourceUnit`] node by node.
///
/// Nodes are opened with [`start_node`](Self::start_node) and closed with
/// [`finish_node`](Self::finish_node); tokens are leaves. Unless a span is
/// set explicitly, spans are synthesized from a running cursor: each token
/// occupies its text and is followed by one column of spacing, and a node
/// covers its children.
///
/// ```
/// use netlint::source::LanguageId;
/// use netlint::syntax::SourceBuilder;
///
/// let mut b = SourceBuilder::new("Program.cs", LanguageId::CSharp);
/// b.start_node("CompilationUnit");
/// b.token("SemicolonToken", ";");
/// b.finish_node();
/// let unit = b.finish().unwrap();
/// assert_eq!(unit.tree.root().kind(), "CompilationUnit");
/// ```
#[derive(Debug)]
pub struct SourceBuilder {
    path: PathBuf,
    language: LanguageId,
    generated: bool,
    test_project: bool,
    nodes: Vec<NodeData>,
    explicit_span: Vec<bool>,
    stack: Vec<NodeId>,
    root: Option<NodeId>,
    last_token: Option<NodeId>,
    pending_leading: Vec<Trivia>,
    model: SymbolTable,
    line: usize,
    column: usize,
    errors: Vec<String>,
}

impl SourceBuilder {
    pub fn new(path: impl Into<PathBuf>, language: LanguageId) -> Self {
        Self {
            path: path.into(),
            language,
            generated: false,
            test_project: false,
            nodes: Vec::new(),
            explicit_span: Vec::new(),
            stack: Vec::new(),
            root: None,
            last_token: None,
            pending_leading: Vec::new(),
            model: SymbolTable::new(),
            line: 1,
            column: 1,
            errors: Vec::new(),
        }
    }

    /// Mark the unit as generated code
    pub fn generated(mut self, generated: bool) -> Self {
        self.generated = generated;
        self
    }

    /// Mark the unit as belonging to a test project
    pub fn test_project(mut self, test_project: bool) -> Self {
        self.test_project = test_project;
        self
    }

    pub fn start_node(&mut self, kind: &str) -> NodeId {
        self.push(NodeData::new(kind, None, None), true)
    }

    pub fn start_node_as(&mut self, role: &str, kind: &str) -> NodeId {
        self.push(NodeData::new(kind, Some(role), None), true)
    }

    pub fn token(&mut self, kind: &str, text: &str) -> NodeId {
        self.push_token(NodeData::new(kind, None, Some(text)))
    }

    pub fn token_as(&mut self, role: &str, kind: &str, text: &str) -> NodeId {
        self.push_token(NodeData::new(kind, Some(role), Some(text)))
    }

    /// Close the innermost open node
    pub fn finish_node(&mut self) -> Option<NodeId> {
        let Some(id) = self.stack.pop() else {
            self.errors
                .push("finish_node called without an open node".to_string());
            return None;
        };

        if !self.explicit_span[id.index()] {
            let data = &self.nodes[id.index()];
            let span = data
                .children
                .iter()
                .map(|c| self.nodes[c.index()].span)
                .reduce(Span::cover)
                .unwrap_or_else(|| self.cursor_span());
            self.nodes[id.index()].span = span;
        }
        Some(id)
    }

    /// Queue trivia in front of the next token
    pub fn leading_trivia(&mut self, kind: TriviaKind, text: &str) {
        self.advance(text);
        self.pending_leading.push(Trivia::new(kind, text));
    }

    /// Attach trivia after the most recent token
    pub fn trailing_trivia(&mut self, kind: TriviaKind, text: &str) {
        self.advance(text);
        match self.last_token {
            Some(id) => self.nodes[id.index()]
                .trailing_trivia
                .push(Trivia::new(kind, text)),
            None => self.pending_leading.push(Trivia::new(kind, text)),
        }
    }

    /// Move the synthetic cursor to the start of the next line
    pub fn newline(&mut self) {
        self.line += 1;
        self.column = 1;
    }

    /// Register a symbol and return its assigned id
    pub fn add_symbol(&mut self, mut symbol: Symbol) -> SymbolId {
        let id = self.model.next_id();
        symbol.id = id;
        self.model.insert(symbol);
        id
    }

    /// Register a symbol that already carries its id
    pub(crate) fn insert_symbol(&mut self, symbol: Symbol) {
        self.model.insert(symbol);
    }

    /// Record the symbol a node refers to
    pub fn bind(&mut self, node: NodeId, symbol: SymbolId) {
        self.model.bind(node, symbol);
    }

    /// Record the symbol a node declares
    pub fn declare(&mut self, node: NodeId, symbol: SymbolId) {
        self.model.declare(node, symbol);
    }

    /// Record the fully qualified type of an expression node
    pub fn set_type(&mut self, node: NodeId, type_name: &str) {
        self.model.set_type(node, type_name);
    }

    /// Record the compile-time value of an expression node
    pub fn set_constant(&mut self, node: NodeId, value: ConstantValue) {
        self.model.set_constant(node, value);
    }

    /// Override the synthesized span of a node
    pub fn set_span(&mut self, node: NodeId, span: Span) {
        if let Some(data) = self.nodes.get_mut(node.index()) {
            data.span = span;
            self.explicit_span[node.index()] = true;
        }
    }

    pub(crate) fn push_trivia(&mut self, node: NodeId, leading: bool, trivia: Trivia) {
        if let Some(data) = self.nodes.get_mut(node.index()) {
            if leading {
                data.leading_trivia.push(trivia);
            } else {
                data.trailing_trivia.push(trivia);
            }
        }
    }

    /// Validate the tree shape and produce the finished unit
    pub fn finish(self) -> Result<SourceUnit, ParseError> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(ParseError::Invalid(error));
        }
        if !self.stack.is_empty() {
            return Err(ParseError::Invalid(format!(
                "{} node(s) left open",
                self.stack.len()
            )));
        }
        let root = self
            .root
            .ok_or_else(|| ParseError::Invalid("document has no root node".to_string()))?;

        Ok(SourceUnit {
            path: self.path,
            language: self.language,
            tree: SyntaxTree::from_parts(self.nodes, root),
            model: self.model,
            generated: self.generated,
            test_project: self.test_project,
        })
    }

    fn push(&mut self, data: NodeData, open: bool) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let parent = self.stack.last().copied();

        match parent {
            Some(parent) => self.nodes[parent.index()].children.push(id),
            None if self.root.is_none() => self.root = Some(id),
            None => self.errors.push(format!(
                "second root node '{}' outside the document root",
                data.kind
            )),
        }

        self.nodes.push(NodeData { parent, ..data });
        self.explicit_span.push(false);
        if open {
            self.stack.push(id);
        }
        id
    }

    fn push_token(&mut self, mut data: NodeData) -> NodeId {
        let text = data.text.clone().unwrap_or_default();
        data.leading_trivia = std::mem::take(&mut self.pending_leading);

        let (start_line, start_column) = (self.line, self.column);
        self.advance(&text);
        data.span = Span::new(start_line, start_column, self.line, self.column);
        self.column += 1;

        let id = self.push(data, false);
        self.last_token = Some(id);
        id
    }

    fn advance(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.newline();
            } else {
                self.column += 1;
            }
        }
    }

    fn cursor_span(&self) -> Span {
        Span::new(self.line, self.column, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::SymbolKind;

    #[test]
    fn test_synthetic_token_spans() {
        let mut b = SourceBuilder::new("a.cs", LanguageId::CSharp);
        b.start_node("CompilationUnit");
        let first = b.token("IdentifierToken", "abc");
        let second = b.token("SemicolonToken", ";");
        b.newline();
        let third = b.token("IdentifierToken", "x");
        b.finish_node();
        let unit = b.finish().unwrap();

        assert_eq!(unit.tree.node(first).span(), Span::new(1, 1, 1, 4));
        assert_eq!(unit.tree.node(second).span(), Span::new(1, 5, 1, 6));
        assert_eq!(unit.tree.node(third).span(), Span::new(2, 1, 2, 2));
        assert_eq!(unit.tree.root().span(), Span::new(1, 1, 2, 2));
    }

    #[test]
    fn test_explicit_span_is_kept() {
        let mut b = SourceBuilder::new("a.cs", LanguageId::CSharp);
        let root = b.start_node("CompilationUnit");
        b.set_span(root, Span::new(10, 1, 12, 1));
        b.token("IdentifierToken", "abc");
        b.finish_node();
        let unit = b.finish().unwrap();
        assert_eq!(unit.tree.root().span(), Span::new(10, 1, 12, 1));
    }

    #[test]
    fn test_leading_trivia_attaches_to_next_token() {
        let mut b = SourceBuilder::new("a.cs", LanguageId::CSharp);
        b.start_node("Block");
        b.token("OpenBraceToken", "{");
        b.leading_trivia(TriviaKind::SingleLineComment, "// TODO");
        let close = b.token("CloseBraceToken", "}");
        b.finish_node();
        let unit = b.finish().unwrap();

        let trivia = unit.tree.node(close).leading_trivia();
        assert_eq!(trivia.len(), 1);
        assert_eq!(trivia[0].text, "// TODO");
    }

    #[test]
    fn test_unbalanced_tree_is_rejected() {
        let mut b = SourceBuilder::new("a.cs", LanguageId::CSharp);
        b.start_node("CompilationUnit");
        b.start_node("ClassDeclaration");
        b.finish_node();
        assert!(matches!(b.finish(), Err(ParseError::Invalid(_))));

        let mut b = SourceBuilder::new("a.cs", LanguageId::CSharp);
        b.start_node("CompilationUnit");
        b.finish_node();
        b.finish_node();
        assert!(b.finish().is_err());
    }

    #[test]
    fn test_empty_builder_has_no_root() {
        let b = SourceBuilder::new("a.cs", LanguageId::CSharp);
        assert!(b.finish().is_err());
    }

    #[test]
    fn test_symbols_are_bound() {
        let mut b = SourceBuilder::new("a.cs", LanguageId::CSharp).test_project(true);
        b.start_node("CompilationUnit");
        let name = b.token("IdentifierToken", "i");
        b.finish_node();
        let sym = b.add_symbol(Symbol::new(SymbolKind::Local, "i"));
        b.declare(name, sym);
        let unit = b.finish().unwrap();

        assert!(unit.test_project);
        assert_eq!(unit.model.declared(name).map(|s| s.name.as_str()), Some("i"));
    }
}
