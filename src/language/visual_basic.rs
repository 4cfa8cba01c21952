//! Visual Basic grammar

use super::{Language, NameComparison};
use crate::semantic::KnownType;
use crate::source::LanguageId;
use crate::syntax::{syntax_kinds, KindSet, Node};

syntax_kinds! {
    /// Visual Basic node, token and keyword kinds
    pub enum VisualBasicKind {
        CompilationUnit,
        ImportsStatement,
        NamespaceBlock,
        NamespaceStatement,
        EndNamespaceStatement,
        ClassBlock,
        ClassStatement,
        EndClassStatement,
        ModuleBlock,
        ModuleStatement,
        EndModuleStatement,
        StructureBlock,
        StructureStatement,
        EndStructureStatement,
        InterfaceBlock,
        InterfaceStatement,
        EndInterfaceStatement,
        SubBlock,
        FunctionBlock,
        SubStatement,
        FunctionStatement,
        EndSubStatement,
        EndFunctionStatement,
        PropertyBlock,
        PropertyStatement,
        FieldDeclaration,
        LocalDeclarationStatement,
        VariableDeclarator,
        ModifiedIdentifier,
        SimpleAsClause,
        AsNewClause,
        EqualsValue,
        ParameterList,
        Parameter,
        TypeParameterList,
        TypeParameter,

        ExpressionStatement,
        CallStatement,
        ReturnStatement,
        ForBlock,
        ForStatement,
        NextStatement,
        SimpleAssignmentStatement,
        AddAssignmentStatement,
        SubtractAssignmentStatement,
        MultiplyAssignmentStatement,
        DivideAssignmentStatement,
        IntegerDivideAssignmentStatement,
        ExponentiateAssignmentStatement,
        LeftShiftAssignmentStatement,
        RightShiftAssignmentStatement,
        ConcatenateAssignmentStatement,

        IdentifierName,
        GenericName,
        QualifiedName,
        PredefinedType,
        TypeArgumentList,
        SimpleMemberAccessExpression,
        InvocationExpression,
        ArgumentList,
        SimpleArgument,
        NameColonEquals,
        ObjectCreationExpression,
        ObjectMemberInitializer,
        NamedFieldInitializer,
        ParenthesizedExpression,
        TupleExpression,
        StringLiteralExpression,
        NumericLiteralExpression,
        CharacterLiteralExpression,
        TrueLiteralExpression,
        FalseLiteralExpression,
        NothingLiteralExpression,
        DateLiteralExpression,
        InterpolatedStringExpression,
        ConcatenateExpression,
        AddExpression,

        IdentifierToken,
        StringLiteralToken,
        IntegerLiteralToken,
        CharacterLiteralToken,
        DateLiteralToken,
        EqualsToken,
        DotToken,
        OpenParenToken,
        CloseParenToken,
        CommaToken,
        AmpersandToken,
        PlusToken,
        PlusEqualsToken,
        MinusEqualsToken,
        AsteriskEqualsToken,
        SlashEqualsToken,
        AmpersandEqualsToken,

        DimKeyword,
        AsKeyword,
        NewKeyword,
        SubKeyword,
        FunctionKeyword,
        EndKeyword,
        ClassKeyword,
        ModuleKeyword,
        StructureKeyword,
        InterfaceKeyword,
        PropertyKeyword,
        PublicKeyword,
        PrivateKeyword,
        FriendKeyword,
        ProtectedKeyword,
        SharedKeyword,
        OverridableKeyword,
        OverridesKeyword,
        MustOverrideKeyword,
        ConstKeyword,
        ReadOnlyKeyword,
        StringKeyword,
        IntegerKeyword,
        DateKeyword,
        TrueKeyword,
        FalseKeyword,
        NothingKeyword,
        ReturnKeyword,
        ForKeyword,
        ToKeyword,
        NextKeyword,
        CallKeyword,
        OfKeyword,
        WithKeyword,
        NamespaceKeyword,
        ImportsKeyword,
    }
}

use VisualBasicKind::*;

const NONE: KindSet<VisualBasicKind> = KindSet::new(&[]);
const IDENTIFIER_TOKENS: KindSet<VisualBasicKind> = KindSet::new(&[IdentifierToken]);
const IDENTIFIER_NAMES: KindSet<VisualBasicKind> = KindSet::new(&[IdentifierName]);
const MEMBER_ACCESS: KindSet<VisualBasicKind> = KindSet::new(&[SimpleMemberAccessExpression]);
const PARENTHESIZED: KindSet<VisualBasicKind> = KindSet::new(&[ParenthesizedExpression]);
const OBJECT_CREATION: KindSet<VisualBasicKind> = KindSet::new(&[ObjectCreationExpression]);
const ARGUMENT_LISTS: KindSet<VisualBasicKind> = KindSet::new(&[ArgumentList]);
const ARGUMENTS: KindSet<VisualBasicKind> = KindSet::new(&[SimpleArgument]);
const SIMPLE_ASSIGNMENT: KindSet<VisualBasicKind> = KindSet::new(&[SimpleAssignmentStatement]);
const ASSIGNMENTS: KindSet<VisualBasicKind> = KindSet::new(&[
    SimpleAssignmentStatement,
    AddAssignmentStatement,
    SubtractAssignmentStatement,
    MultiplyAssignmentStatement,
    DivideAssignmentStatement,
    IntegerDivideAssignmentStatement,
    ExponentiateAssignmentStatement,
    LeftShiftAssignmentStatement,
    RightShiftAssignmentStatement,
    ConcatenateAssignmentStatement,
]);
const TUPLES: KindSet<VisualBasicKind> = KindSet::new(&[TupleExpression]);
const STRING_LITERALS: KindSet<VisualBasicKind> = KindSet::new(&[StringLiteralExpression]);
const CONSTANT_LITERALS: KindSet<VisualBasicKind> = KindSet::new(&[
    StringLiteralExpression,
    NumericLiteralExpression,
    CharacterLiteralExpression,
    TrueLiteralExpression,
    FalseLiteralExpression,
    NothingLiteralExpression,
    DateLiteralExpression,
]);
const LITERAL_TYPES: &[(VisualBasicKind, KnownType)] = &[
    (StringLiteralExpression, KnownType::SYSTEM_STRING),
    (CharacterLiteralExpression, KnownType::new("System.Char")),
    (TrueLiteralExpression, KnownType::new("System.Boolean")),
    (FalseLiteralExpression, KnownType::new("System.Boolean")),
    (DateLiteralExpression, KnownType::SYSTEM_DATE_TIME),
    (NumericLiteralExpression, KnownType::new("System.Int32")),
];

/// Nodes whose identifier sits one level down
const NAMED_HEADERS: KindSet<VisualBasicKind> = KindSet::new(&[
    ModifiedIdentifier,
    SubStatement,
    FunctionStatement,
    PropertyStatement,
    ClassStatement,
    ModuleStatement,
    StructureStatement,
    InterfaceStatement,
]);

/// The Visual Basic grammar; identifiers compare case-insensitively
#[derive(Debug, Clone, Copy, Default)]
pub struct VisualBasic;

impl Language for VisualBasic {
    type Kind = VisualBasicKind;

    fn id(&self) -> LanguageId {
        LanguageId::VisualBasic
    }

    fn name_comparison(&self) -> NameComparison {
        NameComparison::CaseInsensitive
    }

    fn identifier_token_kinds(&self) -> KindSet<VisualBasicKind> {
        IDENTIFIER_TOKENS
    }

    fn identifier_name_kinds(&self) -> KindSet<VisualBasicKind> {
        IDENTIFIER_NAMES
    }

    fn member_access_kinds(&self) -> KindSet<VisualBasicKind> {
        MEMBER_ACCESS
    }

    fn parenthesized_kinds(&self) -> KindSet<VisualBasicKind> {
        PARENTHESIZED
    }

    fn object_creation_kinds(&self) -> KindSet<VisualBasicKind> {
        OBJECT_CREATION
    }

    fn argument_list_kinds(&self) -> KindSet<VisualBasicKind> {
        ARGUMENT_LISTS
    }

    fn argument_kinds(&self) -> KindSet<VisualBasicKind> {
        ARGUMENTS
    }

    fn simple_assignment_kinds(&self) -> KindSet<VisualBasicKind> {
        SIMPLE_ASSIGNMENT
    }

    fn assignment_kinds(&self) -> KindSet<VisualBasicKind> {
        ASSIGNMENTS
    }

    fn tuple_kinds(&self) -> KindSet<VisualBasicKind> {
        TUPLES
    }

    fn declaration_pattern_kinds(&self) -> KindSet<VisualBasicKind> {
        NONE
    }

    fn variable_designation_kinds(&self) -> KindSet<VisualBasicKind> {
        NONE
    }

    fn string_literal_kinds(&self) -> KindSet<VisualBasicKind> {
        STRING_LITERALS
    }

    fn constant_literal_kinds(&self) -> KindSet<VisualBasicKind> {
        CONSTANT_LITERALS
    }

    fn literal_types(&self) -> &'static [(VisualBasicKind, KnownType)] {
        LITERAL_TYPES
    }

    fn unquote_string(&self, text: &str) -> Option<String> {
        let inner = text.strip_prefix('"')?.strip_suffix('"')?;
        Some(inner.replace("\"\"", "\""))
    }

    fn identifier_value<'a>(&self, text: &'a str) -> &'a str {
        text.strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
            .unwrap_or(text)
    }

    fn node_identifier<'a>(&self, node: Node<'a>) -> Option<Node<'a>> {
        if self.is_any_kind(node, IDENTIFIER_TOKENS) {
            return Some(node);
        }
        if self.is_any_kind(node, MEMBER_ACCESS) {
            return node
                .child_nodes()
                .last()
                .and_then(|name| self.node_identifier(name));
        }
        node.children()
            .find(|c| self.is_any_kind(*c, IDENTIFIER_TOKENS))
            .or_else(|| {
                node.child_nodes()
                    .find(|c| self.is_any_kind(*c, NAMED_HEADERS))
                    .and_then(|header| self.node_identifier(header))
            })
    }
}
