//! C# grammar

use super::{Language, NameComparison};
use crate::semantic::KnownType;
use crate::source::LanguageId;
use crate::syntax::{syntax_kinds, KindSet, Node};

syntax_kinds! {
    /// C# node, token and keyword kinds, named after the Roslyn `SyntaxKind` members
    pub enum CSharpKind {
        // Declarations
        CompilationUnit,
        NamespaceDeclaration,
        FileScopedNamespaceDeclaration,
        UsingDirective,
        ClassDeclaration,
        StructDeclaration,
        InterfaceDeclaration,
        RecordDeclaration,
        RecordStructDeclaration,
        EnumDeclaration,
        DelegateDeclaration,
        MethodDeclaration,
        ConstructorDeclaration,
        DestructorDeclaration,
        OperatorDeclaration,
        PropertyDeclaration,
        IndexerDeclaration,
        FieldDeclaration,
        EventFieldDeclaration,
        AccessorList,
        GetAccessorDeclaration,
        SetAccessorDeclaration,
        InitAccessorDeclaration,
        LocalFunctionStatement,
        TypeParameterList,
        TypeParameter,
        ParameterList,
        Parameter,
        BaseList,
        SimpleBaseType,
        AttributeList,
        Attribute,
        ArrowExpressionClause,
        EqualsValueClause,
        VariableDeclaration,
        VariableDeclarator,

        // Statements
        Block,
        LocalDeclarationStatement,
        ExpressionStatement,
        ReturnStatement,
        IfStatement,
        ElseClause,
        WhileStatement,
        DoStatement,
        ForStatement,
        ForEachStatement,
        EmptyStatement,
        ThrowStatement,
        BreakStatement,
        ContinueStatement,

        // Names and types
        IdentifierName,
        GenericName,
        QualifiedName,
        AliasQualifiedName,
        PredefinedType,
        TypeArgumentList,
        NullableType,
        ArrayType,

        // Expressions
        SimpleMemberAccessExpression,
        ConditionalAccessExpression,
        MemberBindingExpression,
        InvocationExpression,
        ArgumentList,
        Argument,
        NameColon,
        ObjectCreationExpression,
        ImplicitObjectCreationExpression,
        ObjectInitializerExpression,
        ParenthesizedExpression,
        TupleExpression,
        DeclarationExpression,
        SingleVariableDesignation,
        ParenthesizedVariableDesignation,
        DiscardDesignation,
        StringLiteralExpression,
        NumericLiteralExpression,
        CharacterLiteralExpression,
        TrueLiteralExpression,
        FalseLiteralExpression,
        NullLiteralExpression,
        DefaultLiteralExpression,
        InterpolatedStringExpression,
        AddExpression,
        SubtractExpression,
        MultiplyExpression,
        DivideExpression,
        LessThanExpression,
        LessThanOrEqualExpression,
        GreaterThanExpression,
        GreaterThanOrEqualExpression,
        EqualsExpression,
        NotEqualsExpression,
        LogicalAndExpression,
        LogicalOrExpression,
        LogicalNotExpression,
        CastExpression,
        ThisExpression,
        SimpleAssignmentExpression,
        AddAssignmentExpression,
        SubtractAssignmentExpression,
        MultiplyAssignmentExpression,
        DivideAssignmentExpression,
        ModuloAssignmentExpression,
        AndAssignmentExpression,
        ExclusiveOrAssignmentExpression,
        OrAssignmentExpression,
        LeftShiftAssignmentExpression,
        RightShiftAssignmentExpression,
        CoalesceAssignmentExpression,
        PreIncrementExpression,
        PreDecrementExpression,
        PostIncrementExpression,
        PostDecrementExpression,

        // Tokens
        IdentifierToken,
        StringLiteralToken,
        NumericLiteralToken,
        CharacterLiteralToken,
        OpenBraceToken,
        CloseBraceToken,
        OpenParenToken,
        CloseParenToken,
        OpenBracketToken,
        CloseBracketToken,
        LessThanToken,
        LessThanEqualsToken,
        GreaterThanToken,
        GreaterThanEqualsToken,
        EqualsEqualsToken,
        ExclamationEqualsToken,
        ExclamationToken,
        CommaToken,
        SemicolonToken,
        ColonToken,
        DotToken,
        QuestionToken,
        EqualsToken,
        EqualsGreaterThanToken,
        PlusToken,
        MinusToken,
        AsteriskToken,
        SlashToken,
        PlusPlusToken,
        MinusMinusToken,
        PlusEqualsToken,
        MinusEqualsToken,
        AsteriskEqualsToken,
        SlashEqualsToken,
        PercentEqualsToken,
        AmpersandEqualsToken,
        CaretEqualsToken,
        BarEqualsToken,
        LessThanLessThanEqualsToken,
        GreaterThanGreaterThanEqualsToken,
        QuestionQuestionEqualsToken,
        AmpersandAmpersandToken,
        BarBarToken,

        // Keywords
        PublicKeyword,
        PrivateKeyword,
        ProtectedKeyword,
        InternalKeyword,
        StaticKeyword,
        VirtualKeyword,
        OverrideKeyword,
        AbstractKeyword,
        SealedKeyword,
        AsyncKeyword,
        ReadOnlyKeyword,
        ConstKeyword,
        PartialKeyword,
        ExternKeyword,
        NewKeyword,
        ClassKeyword,
        StructKeyword,
        InterfaceKeyword,
        RecordKeyword,
        EnumKeyword,
        NamespaceKeyword,
        UsingKeyword,
        VoidKeyword,
        IntKeyword,
        LongKeyword,
        StringKeyword,
        BoolKeyword,
        ObjectKeyword,
        ForKeyword,
        ForEachKeyword,
        InKeyword,
        WhileKeyword,
        DoKeyword,
        IfKeyword,
        ElseKeyword,
        ReturnKeyword,
        ThrowKeyword,
        BreakKeyword,
        ContinueKeyword,
        TrueKeyword,
        FalseKeyword,
        NullKeyword,
        DefaultKeyword,
        ThisKeyword,
        GetKeyword,
        SetKeyword,
        InitKeyword,
        WhereKeyword,
    }
}

use CSharpKind::*;

const IDENTIFIER_TOKENS: KindSet<CSharpKind> = KindSet::new(&[IdentifierToken]);
const IDENTIFIER_NAMES: KindSet<CSharpKind> = KindSet::new(&[IdentifierName]);
const MEMBER_ACCESS: KindSet<CSharpKind> = KindSet::new(&[SimpleMemberAccessExpression]);
const PARENTHESIZED: KindSet<CSharpKind> = KindSet::new(&[ParenthesizedExpression]);
const OBJECT_CREATION: KindSet<CSharpKind> =
    KindSet::new(&[ObjectCreationExpression, ImplicitObjectCreationExpression]);
const ARGUMENT_LISTS: KindSet<CSharpKind> = KindSet::new(&[ArgumentList]);
const ARGUMENTS: KindSet<CSharpKind> = KindSet::new(&[Argument]);
const SIMPLE_ASSIGNMENT: KindSet<CSharpKind> = KindSet::new(&[SimpleAssignmentExpression]);
const ASSIGNMENTS: KindSet<CSharpKind> = KindSet::new(&[
    SimpleAssignmentExpression,
    AddAssignmentExpression,
    SubtractAssignmentExpression,
    MultiplyAssignmentExpression,
    DivideAssignmentExpression,
    ModuloAssignmentExpression,
    AndAssignmentExpression,
    ExclusiveOrAssignmentExpression,
    OrAssignmentExpression,
    LeftShiftAssignmentExpression,
    RightShiftAssignmentExpression,
    CoalesceAssignmentExpression,
]);
const TUPLES: KindSet<CSharpKind> = KindSet::new(&[TupleExpression]);
const DECLARATION_PATTERNS: KindSet<CSharpKind> = KindSet::new(&[DeclarationExpression]);
const VARIABLE_DESIGNATIONS: KindSet<CSharpKind> = KindSet::new(&[SingleVariableDesignation]);
const STRING_LITERALS: KindSet<CSharpKind> = KindSet::new(&[StringLiteralExpression]);
const CONSTANT_LITERALS: KindSet<CSharpKind> = KindSet::new(&[
    StringLiteralExpression,
    NumericLiteralExpression,
    CharacterLiteralExpression,
    TrueLiteralExpression,
    FalseLiteralExpression,
    NullLiteralExpression,
]);
const RECORDS: KindSet<CSharpKind> = KindSet::new(&[RecordDeclaration, RecordStructDeclaration]);
const LITERAL_TYPES: &[(CSharpKind, KnownType)] = &[
    (StringLiteralExpression, KnownType::SYSTEM_STRING),
    (CharacterLiteralExpression, KnownType::new("System.Char")),
    (TrueLiteralExpression, KnownType::new("System.Boolean")),
    (FalseLiteralExpression, KnownType::new("System.Boolean")),
    (NumericLiteralExpression, KnownType::new("System.Int32")),
];

/// The C# grammar; identifiers compare case-sensitively
#[derive(Debug, Clone, Copy, Default)]
pub struct CSharp;

impl Language for CSharp {
    type Kind = CSharpKind;

    fn id(&self) -> LanguageId {
        LanguageId::CSharp
    }

    fn name_comparison(&self) -> NameComparison {
        NameComparison::CaseSensitive
    }

    fn identifier_token_kinds(&self) -> KindSet<CSharpKind> {
        IDENTIFIER_TOKENS
    }

    fn identifier_name_kinds(&self) -> KindSet<CSharpKind> {
        IDENTIFIER_NAMES
    }

    fn member_access_kinds(&self) -> KindSet<CSharpKind> {
        MEMBER_ACCESS
    }

    fn parenthesized_kinds(&self) -> KindSet<CSharpKind> {
        PARENTHESIZED
    }

    fn object_creation_kinds(&self) -> KindSet<CSharpKind> {
        OBJECT_CREATION
    }

    fn argument_list_kinds(&self) -> KindSet<CSharpKind> {
        ARGUMENT_LISTS
    }

    fn argument_kinds(&self) -> KindSet<CSharpKind> {
        ARGUMENTS
    }

    fn simple_assignment_kinds(&self) -> KindSet<CSharpKind> {
        SIMPLE_ASSIGNMENT
    }

    fn assignment_kinds(&self) -> KindSet<CSharpKind> {
        ASSIGNMENTS
    }

    fn tuple_kinds(&self) -> KindSet<CSharpKind> {
        TUPLES
    }

    fn declaration_pattern_kinds(&self) -> KindSet<CSharpKind> {
        DECLARATION_PATTERNS
    }

    fn variable_designation_kinds(&self) -> KindSet<CSharpKind> {
        VARIABLE_DESIGNATIONS
    }

    fn string_literal_kinds(&self) -> KindSet<CSharpKind> {
        STRING_LITERALS
    }

    fn constant_literal_kinds(&self) -> KindSet<CSharpKind> {
        CONSTANT_LITERALS
    }

    fn literal_types(&self) -> &'static [(CSharpKind, KnownType)] {
        LITERAL_TYPES
    }

    fn unquote_string(&self, text: &str) -> Option<String> {
        if let Some(verbatim) = text.strip_prefix('@') {
            let inner = verbatim.strip_prefix('"')?.strip_suffix('"')?;
            return Some(inner.replace("\"\"", "\""));
        }
        if text.len() >= 6 && text.starts_with("\"\"\"") && text.ends_with("\"\"\"") {
            return Some(text.trim_matches('"').trim().to_string());
        }
        let inner = text.strip_prefix('"')?.strip_suffix('"')?;
        Some(unescape(inner))
    }

    fn identifier_value<'a>(&self, text: &'a str) -> &'a str {
        text.strip_prefix('@').unwrap_or(text)
    }

    fn is_positional_record(&self, node: Node<'_>) -> bool {
        self.is_any_kind(node, RECORDS) && node.has_child_of_kind("ParameterList")
    }
}

/// Resolve backslash escapes of a regular string literal body
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('a') => out.push('\u{7}'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some(marker @ ('u' | 'U' | 'x')) => {
                let max = if marker == 'U' { 8 } else { 4 };
                let digits: String = chars
                    .clone()
                    .take(max)
                    .take_while(char::is_ascii_hexdigit)
                    .collect();
                for _ in 0..digits.len() {
                    chars.next();
                }
                match u32::from_str_radix(&digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push(marker);
                        out.push_str(&digits);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
