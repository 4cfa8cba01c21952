//! Source units: a syntax tree, its semantic model, and host metadata
//!
//! Front-ends hand units over either through [`SourceBuilder`] or as a JSON
//! interchange document:
//!
//! ```json
//! {
//!   "path": "src/Program.cs",
//!   "language": "csharp",
//!   "generated": false,
//!   "test_project": false,
//!   "symbols": [{ "id": 0, "name": "i", "kind": "local" }],
//!   "root": {
//!     "kind": "CompilationUnit",
//!     "children": [{ "kind": "IdentifierToken", "text": "i", "declares": 0 }]
//!   }
//! }
//! ```

use crate::semantic::{ConstantValue, Symbol, SymbolId, SymbolTable};
use crate::syntax::{NodeId, SourceBuilder, Span, SyntaxTree, Trivia};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error while reading an interchange document
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid document: {0}")]
    Invalid(String),
}

/// Front-end grammar of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageId {
    #[serde(rename = "csharp", alias = "cs", alias = "c#")]
    CSharp,
    #[serde(rename = "visualbasic", alias = "vb", alias = "vbnet")]
    VisualBasic,
}

impl std::fmt::Display for LanguageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LanguageId::CSharp => write!(f, "csharp"),
            LanguageId::VisualBasic => write!(f, "visualbasic"),
        }
    }
}

impl std::str::FromStr for LanguageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csharp" | "cs" | "c#" => Ok(LanguageId::CSharp),
            "visualbasic" | "vb" | "vbnet" => Ok(LanguageId::VisualBasic),
            _ => Err(format!("Unknown language: {}", s)),
        }
    }
}

/// One analyzable file
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub language: LanguageId,
    pub tree: SyntaxTree,
    pub model: SymbolTable,
    /// Host classified the file as generated code
    pub generated: bool,
    /// File belongs to a test project
    pub test_project: bool,
}

#[derive(Debug, Deserialize)]
struct InterchangeDocument {
    #[serde(default)]
    path: Option<PathBuf>,
    language: LanguageId,
    #[serde(default)]
    generated: bool,
    #[serde(default)]
    test_project: bool,
    #[serde(default)]
    symbols: Vec<Symbol>,
    root: InterchangeNode,
}

#[derive(Debug, Deserialize)]
struct InterchangeNode {
    kind: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    span: Option<Span>,
    #[serde(default)]
    leading_trivia: Vec<Trivia>,
    #[serde(default)]
    trailing_trivia: Vec<Trivia>,
    #[serde(default)]
    symbol: Option<SymbolId>,
    #[serde(default)]
    declares: Option<SymbolId>,
    #[serde(default, rename = "type")]
    type_name: Option<String>,
    #[serde(default)]
    constant: Option<ConstantValue>,
    #[serde(default)]
    children: Vec<InterchangeNode>,
}

impl SourceUnit {
    /// Parse an interchange document; `path` is used when the document has none
    pub fn from_json(content: &str, path: &Path) -> Result<Self, ParseError> {
        let document: InterchangeDocument = serde_json::from_str(content)?;

        let mut builder = SourceBuilder::new(
            document.path.unwrap_or_else(|| path.to_path_buf()),
            document.language,
        )
        .generated(document.generated)
        .test_project(document.test_project);

        for symbol in document.symbols {
            builder.insert_symbol(symbol);
        }
        add_node(&mut builder, &document.root)?;
        builder.finish()
    }

    /// Read and parse an interchange document from disk
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content, path)
    }
}

fn add_node(builder: &mut SourceBuilder, node: &InterchangeNode) -> Result<NodeId, ParseError> {
    let role = node.role.as_deref();
    let id = match (&node.text, node.children.is_empty()) {
        (Some(text), true) => match role {
            Some(role) => builder.token_as(role, &node.kind, text),
            None => builder.token(&node.kind, text),
        },
        (Some(_), false) => {
            return Err(ParseError::Invalid(format!(
                "node '{}' has both text and children",
                node.kind
            )))
        }
        (None, _) => {
            let id = match role {
                Some(role) => builder.start_node_as(role, &node.kind),
                None => builder.start_node(&node.kind),
            };
            for child in &node.children {
                add_node(builder, child)?;
            }
            builder.finish_node();
            id
        }
    };

    if let Some(span) = node.span {
        builder.set_span(id, span);
    }
    for trivia in &node.leading_trivia {
        builder.push_trivia(id, true, trivia.clone());
    }
    for trivia in &node.trailing_trivia {
        builder.push_trivia(id, false, trivia.clone());
    }
    if let Some(symbol) = node.symbol {
        builder.bind(id, symbol);
    }
    if let Some(symbol) = node.declares {
        builder.declare(id, symbol);
    }
    if let Some(type_name) = &node.type_name {
        builder.set_type(id, type_name);
    }
    if let Some(constant) = &node.constant {
        builder.set_constant(id, constant.clone());
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::SemanticModel;
    use std::io::Write;

    const DOCUMENT: &str = r#"{
        "language": "csharp",
        "test_project": true,
        "symbols": [{ "id": 4, "name": "i", "kind": "local", "type": "System.Int32" }],
        "root": {
            "kind": "CompilationUnit",
            "children": [
                { "kind": "IdentifierToken", "text": "i", "declares": 4,
                  "span": { "start_line": 3, "start_column": 9, "end_line": 3, "end_column": 10 },
                  "trailing_trivia": [{ "kind": "single_line_comment", "text": "// counter" }] },
                { "kind": "NumericLiteralExpression", "type": "System.Int32",
                  "constant": { "type": "integer", "value": 0 },
                  "children": [{ "kind": "NumericLiteralToken", "text": "0" }] }
            ]
        }
    }"#;

    #[test]
    fn test_from_json() {
        let unit = SourceUnit::from_json(DOCUMENT, Path::new("Program.cs.json")).unwrap();
        assert_eq!(unit.language, LanguageId::CSharp);
        assert_eq!(unit.path, PathBuf::from("Program.cs.json"));
        assert!(unit.test_project);
        assert!(!unit.generated);

        let root = unit.tree.root();
        let ident = root.children().next().unwrap();
        assert_eq!(ident.span(), Span::new(3, 9, 3, 10));
        assert_eq!(ident.trailing_trivia().len(), 1);
        assert_eq!(
            unit.model.declared_symbol(ident).map(|s| s.name.as_str()),
            Some("i")
        );

        let literal = root.children().nth(1).unwrap();
        assert_eq!(unit.model.type_of(literal), Some("System.Int32"));
        assert_eq!(
            unit.model.constant_value(literal),
            Some(&ConstantValue::Integer(0))
        );
    }

    #[test]
    fn test_from_json_rejects_text_with_children() {
        let doc = r#"{ "language": "csharp",
            "root": { "kind": "A", "text": "x", "children": [{ "kind": "B" }] } }"#;
        assert!(matches!(
            SourceUnit::from_json(doc, Path::new("a.json")),
            Err(ParseError::Invalid(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_unknown_language() {
        let doc = r#"{ "language": "fortran", "root": { "kind": "A" } }"#;
        assert!(matches!(
            SourceUnit::from_json(doc, Path::new("a.json")),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::Builder::new()
            .suffix(".cs.json")
            .tempfile()
            .unwrap();
        file.write_all(DOCUMENT.as_bytes()).unwrap();

        let unit = SourceUnit::load(file.path()).unwrap();
        assert_eq!(unit.path, file.path());
        assert_eq!(unit.tree.len(), 4);
    }

    #[test]
    fn test_load_missing_file() {
        let result = SourceUnit::load(Path::new("/nonexistent/netlint/unit.cs.json"));
        assert!(matches!(result, Err(ParseError::Io(_))));
    }

    #[test]
    fn test_language_id_from_str() {
        assert_eq!("csharp".parse::<LanguageId>(), Ok(LanguageId::CSharp));
        assert_eq!("VB".parse::<LanguageId>(), Ok(LanguageId::VisualBasic));
        assert!("cobol".parse::<LanguageId>().is_err());
        assert_eq!(LanguageId::VisualBasic.to_string(), "visualbasic");
    }
}
