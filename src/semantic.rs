//! Symbols and semantic bindings supplied alongside a syntax tree

use crate::syntax::{Node, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier of a symbol within one source unit
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SymbolId(pub u32);

/// Symbol category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Namespace,
    Type,
    Method,
    Constructor,
    Property,
    Field,
    Local,
    Parameter,
}

/// A resolved semantic binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    #[serde(default)]
    pub id: SymbolId,

    pub name: String,

    pub kind: SymbolKind,

    /// Fully qualified name of the declaring type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containing_type: Option<String>,

    /// Fully qualified type of a value symbol, or the full name of a type symbol
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(default)]
    pub is_virtual: bool,

    #[serde(default)]
    pub is_abstract: bool,

    #[serde(default)]
    pub is_override: bool,

    /// Member this one overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overridden: Option<SymbolId>,
}

impl Symbol {
    pub fn new(kind: SymbolKind, name: &str) -> Self {
        Self {
            id: SymbolId::default(),
            name: name.to_string(),
            kind,
            containing_type: None,
            type_name: None,
            is_virtual: false,
            is_abstract: false,
            is_override: false,
            overridden: None,
        }
    }

    pub fn with_containing_type(mut self, type_name: &str) -> Self {
        self.containing_type = Some(type_name.to_string());
        self
    }

    pub fn with_type(mut self, type_name: &str) -> Self {
        self.type_name = Some(type_name.to_string());
        self
    }

    pub fn with_virtual(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    pub fn with_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Mark as overriding `member`
    pub fn with_override(mut self, member: Option<SymbolId>) -> Self {
        self.is_override = true;
        self.overridden = member;
        self
    }

    /// Whether the symbol is declared in `owner`
    pub fn is_member_of(&self, owner: KnownType) -> bool {
        self.containing_type.as_deref() == Some(owner.full_name())
    }
}

/// Compile-time constant value of an expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ConstantValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Char(char),
    Null,
}

impl ConstantValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstantValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// A framework type the rules know by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KnownType(&'static str);

impl KnownType {
    pub const SYSTEM_STRING: KnownType = KnownType("System.String");
    pub const SYSTEM_DATE_TIME: KnownType = KnownType("System.DateTime");
    pub const NETWORK_CREDENTIAL: KnownType = KnownType("System.Net.NetworkCredential");
    pub const PASSWORD_DERIVE_BYTES: KnownType =
        KnownType("System.Security.Cryptography.PasswordDeriveBytes");

    pub const fn new(full_name: &'static str) -> Self {
        Self(full_name)
    }

    pub fn full_name(self) -> &'static str {
        self.0
    }

    pub fn matches(self, type_name: &str) -> bool {
        self.0 == type_name
    }
}

impl std::fmt::Display for KnownType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// Read-only semantic queries over one source unit
///
/// Every query may come back empty; callers treat absence as "unknown".
pub trait SemanticModel: Send + Sync {
    /// Symbol an expression or name refers to
    fn symbol_info(&self, node: Node<'_>) -> Option<&Symbol>;

    /// Symbol a declaration introduces
    fn declared_symbol(&self, node: Node<'_>) -> Option<&Symbol>;

    /// Fully qualified type of an expression
    fn type_of(&self, node: Node<'_>) -> Option<&str>;

    /// Compile-time value of an expression
    fn constant_value(&self, node: Node<'_>) -> Option<&ConstantValue>;

    fn symbol(&self, id: SymbolId) -> Option<&Symbol>;
}

/// Symbol table keyed by node id
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<SymbolId, Symbol>,
    references: HashMap<NodeId, SymbolId>,
    declarations: HashMap<NodeId, SymbolId>,
    types: HashMap<NodeId, String>,
    constants: HashMap<NodeId, ConstantValue>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next_id(&self) -> SymbolId {
        self.symbols
            .keys()
            .map(|id| SymbolId(id.0 + 1))
            .max()
            .unwrap_or_default()
    }

    pub fn insert(&mut self, symbol: Symbol) {
        self.symbols.insert(symbol.id, symbol);
    }

    pub fn bind(&mut self, node: NodeId, symbol: SymbolId) {
        self.references.insert(node, symbol);
    }

    pub fn declare(&mut self, node: NodeId, symbol: SymbolId) {
        self.declarations.insert(node, symbol);
    }

    pub fn set_type(&mut self, node: NodeId, type_name: &str) {
        self.types.insert(node, type_name.to_string());
    }

    pub fn set_constant(&mut self, node: NodeId, value: ConstantValue) {
        self.constants.insert(node, value);
    }

    pub fn referenced(&self, node: NodeId) -> Option<&Symbol> {
        self.references
            .get(&node)
            .and_then(|id| self.symbols.get(id))
    }

    pub fn declared(&self, node: NodeId) -> Option<&Symbol> {
        self.declarations
            .get(&node)
            .and_then(|id| self.symbols.get(id))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl SemanticModel for SymbolTable {
    fn symbol_info(&self, node: Node<'_>) -> Option<&Symbol> {
        self.referenced(node.id())
    }

    fn declared_symbol(&self, node: Node<'_>) -> Option<&Symbol> {
        self.declared(node.id())
    }

    fn type_of(&self, node: Node<'_>) -> Option<&str> {
        self.types.get(&node.id()).map(String::as_str)
    }

    fn constant_value(&self, node: Node<'_>) -> Option<&ConstantValue> {
        self.constants.get(&node.id())
    }

    fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(&id)
    }
}
