//! S2068: hard-coded credentials
//!
//! Two detection paths share one descriptor:
//!
//! - trackers for well-known credential APIs (`NetworkCredential`,
//!   `PasswordDeriveBytes`, `NetworkCredential.Password`)
//! - a word heuristic over string literals assigned to declarators,
//!   property initializers and simple assignments, combining the assigned
//!   name, a `word=value` pattern and URI user info

use crate::config::ConfigError;
use crate::diagnostic::Severity;
use crate::language::{CSharp, CSharpKind, Language, VisualBasic, VisualBasicKind};
use crate::rule::{ParameterKind, Rule, RuleCategory, RuleDescriptor, RuleParameter, RuleRegistry};
use crate::semantic::KnownType;
use crate::syntax::{KindSet, Node};
use crate::trackers::{
    ObjectCreationCondition, ObjectCreationTracker, PropertyAccessCondition, PropertyAccessTracker,
};
use regex::Regex;
use std::sync::{Arc, LazyLock, RwLock};

pub const DEFAULT_CREDENTIAL_WORDS: &str = "password, passwd, pwd, passphrase";

const MESSAGE_HARDCODED_PASSWORD: &str = "Please review this hard-coded password.";
const MESSAGE_URI_USER_INFO: &str = "Review this hard-coded URI, which may contain a credential.";
const CREDENTIAL_SEPARATOR: char = ';';

pub static DESCRIPTOR: RuleDescriptor = RuleDescriptor {
    id: "S2068",
    title: "Credentials should not be hard-coded",
    message_format: "{0}",
    severity: Severity::Warning,
    category: RuleCategory::Security,
    enabled_by_default: true,
    description: "Hard-coded passwords and URIs with user info end up in version control \
                  and binaries. Load them from a protected configuration store instead.",
    parameters: &[RuleParameter {
        key: "credentialWords",
        kind: ParameterKind::String,
        description: "Comma separated list of words identifying potential credentials",
        default: DEFAULT_CREDENTIAL_WORDS,
    }],
};

/// Candidate secrets that are really placeholders: `?`, `:name`, `{0}`, quotes
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^\?|:\w+|\{\d+[^}]*\}|"|'$"#).unwrap());

/// `scheme://login:password@` with RFC 3986 user info characters
static URI_USER_INFO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\w+://(?P<login>[\w\-._~%!$&'()*+,;=]+):(?P<password>[\w\-._~%!$&'()*+,;=]+)@",
    )
    .unwrap()
});

/// Normalized credential words and the `word=value` pattern built from them
#[derive(Debug, Clone)]
pub struct CredentialWordSet {
    words: Vec<String>,
    pattern: Option<Regex>,
}

impl CredentialWordSet {
    /// Parse a comma separated list; words are trimmed, lower-cased and de-duplicated
    pub fn parse(list: &str) -> Result<Self, ConfigError> {
        let mut words: Vec<String> = Vec::new();
        for word in list.split(',').map(|w| w.trim().to_lowercase()) {
            if !word.is_empty() && !words.contains(&word) {
                words.push(word);
            }
        }

        let pattern = if words.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
            let source = format!(
                r"(?i)\b(?P<credential>{})\s*[:=]\s*(?P<suffix>.+)$",
                alternatives.join("|")
            );
            Some(Regex::new(&source).map_err(|e| ConfigError::InvalidParameter {
                key: "credentialWords".to_string(),
                value: list.to_string(),
                expected: format!("a list of words ({})", e),
            })?)
        };

        Ok(Self { words, pattern })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w.eq_ignore_ascii_case(word))
    }

    /// Credential words found for `name = value`, lower-cased, in discovery order
    pub fn find(&self, name: &str, value: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for word in split_camel_case(name) {
            let word = word.to_lowercase();
            if self.contains(&word) && !found.contains(&word) {
                found.push(word);
            }
        }

        // a value restating its own name (`password = "Password"`) is a placeholder
        let value_lower = value.to_lowercase();
        if found.iter().any(|w| value_lower.contains(w.as_str())) {
            return Vec::new();
        }

        if let Some(captures) = self.pattern.as_ref().and_then(|p| p.captures(value)) {
            let suffix = captures.name("suffix").map_or("", |m| m.as_str());
            if !is_placeholder(suffix) {
                let word = captures
                    .name("credential")
                    .map_or(String::new(), |m| m.as_str().to_lowercase());
                if !found.contains(&word) {
                    found.push(word);
                }
            }
        }

        found
    }
}

impl Default for CredentialWordSet {
    fn default() -> Self {
        let words: Vec<String> = DEFAULT_CREDENTIAL_WORDS
            .split(", ")
            .map(str::to_string)
            .collect();
        let pattern = Regex::new(&format!(
            r"(?i)\b(?P<credential>{})\s*[:=]\s*(?P<suffix>.+)$",
            words.join("|")
        ))
        .ok();
        Self { words, pattern }
    }
}

/// Shared, swappable credential word set
///
/// Readers take a snapshot; a setter replaces the whole set at once.
#[derive(Debug, Default)]
pub struct CredentialWords {
    current: RwLock<Arc<CredentialWordSet>>,
}

impl CredentialWords {
    pub fn new(set: CredentialWordSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(set)),
        }
    }

    pub fn get(&self) -> Arc<CredentialWordSet> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    pub fn set(&self, set: CredentialWordSet) {
        log::debug!("credential words set to {:?}", set.words());
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(set);
    }
}

/// Split an identifier into words at case changes and non-letters
///
/// An upper-case letter starts a word after a lower-case letter, or when
/// the next letter is lower-case (`HTTPPassword` is `HTTP`, `Password`).
pub fn split_camel_case(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphabetic() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let after_lower = i > 0 && chars[i - 1].is_lowercase();
            let before_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if after_lower || before_lower {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn is_placeholder(suffix: &str) -> bool {
    let candidate = suffix
        .split(CREDENTIAL_SEPARATOR)
        .next()
        .unwrap_or("")
        .trim();
    candidate.is_empty() || PLACEHOLDER.is_match(candidate)
}

/// Whether `value` embeds `scheme://login:password@` with a real-looking password
pub fn contains_uri_user_info(value: &str) -> bool {
    let Some(captures) = URI_USER_INFO.captures(value) else {
        return false;
    };
    let login = captures.name("login").map_or("", |m| m.as_str());
    let password = captures.name("password").map_or("", |m| m.as_str());

    !login.to_lowercase().eq(&password.to_lowercase())
        && password != CREDENTIAL_SEPARATOR.to_string()
        && !PLACEHOLDER.is_match(password)
}

/// Message for a string `value` assigned to `name`, if it looks like a credential
pub fn credential_message(words: &CredentialWordSet, name: &str, value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    let found = words.find(name, value);
    if !found.is_empty() {
        Some(format!(
            "\"{}\" detected here, make sure this is not a hard-coded credential.",
            found.join(", ")
        ))
    } else if contains_uri_user_info(value) {
        Some(MESSAGE_URI_USER_INFO.to_string())
    } else {
        None
    }
}

/// Where a grammar assigns string values to names
pub trait CredentialSyntax: Language {
    /// Declarators, property initializers and simple assignments
    fn credential_candidate_kinds(&self) -> KindSet<Self::Kind>;

    /// Assigned name and value expression of a candidate
    fn assigned_name_and_value<'a>(&self, node: Node<'a>) -> Option<(&'a str, Node<'a>)>;
}

/// Value expression under an initializer clause child of `kind`
fn initializer_value<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    node.first_child_of_kind(kind)?.child_nodes().last()
}

const CSHARP_CANDIDATES: KindSet<CSharpKind> = KindSet::new(&[
    CSharpKind::VariableDeclarator,
    CSharpKind::PropertyDeclaration,
    CSharpKind::SimpleAssignmentExpression,
]);

impl CredentialSyntax for CSharp {
    fn credential_candidate_kinds(&self) -> KindSet<CSharpKind> {
        CSHARP_CANDIDATES
    }

    fn assigned_name_and_value<'a>(&self, node: Node<'a>) -> Option<(&'a str, Node<'a>)> {
        match self.kind(node)? {
            CSharpKind::VariableDeclarator | CSharpKind::PropertyDeclaration => Some((
                self.identifier_text(node)?,
                initializer_value(node, "EqualsValueClause")?,
            )),
            CSharpKind::SimpleAssignmentExpression => Some((
                self.identifier_text(self.assignment_left(node)?)?,
                self.assignment_right(node)?,
            )),
            _ => None,
        }
    }
}

const VISUAL_BASIC_CANDIDATES: KindSet<VisualBasicKind> = KindSet::new(&[
    VisualBasicKind::VariableDeclarator,
    VisualBasicKind::PropertyStatement,
    VisualBasicKind::SimpleAssignmentStatement,
]);

impl CredentialSyntax for VisualBasic {
    fn credential_candidate_kinds(&self) -> KindSet<VisualBasicKind> {
        VISUAL_BASIC_CANDIDATES
    }

    fn assigned_name_and_value<'a>(&self, node: Node<'a>) -> Option<(&'a str, Node<'a>)> {
        match self.kind(node)? {
            VisualBasicKind::VariableDeclarator | VisualBasicKind::PropertyStatement => Some((
                self.identifier_text(node)?,
                initializer_value(node, "EqualsValue")?,
            )),
            VisualBasicKind::SimpleAssignmentStatement => Some((
                self.identifier_text(self.assignment_left(node)?)?,
                self.assignment_right(node)?,
            )),
            _ => None,
        }
    }
}

/// Hard-coded credentials (S2068)
pub struct HardcodedCredentials {
    words: Arc<CredentialWords>,
}

impl HardcodedCredentials {
    pub fn new(words: Arc<CredentialWords>) -> Self {
        Self { words }
    }
}

impl<L: CredentialSyntax> Rule<L> for HardcodedCredentials {
    fn descriptor(&self) -> &'static RuleDescriptor {
        &DESCRIPTOR
    }

    fn initialize(&self, registry: &mut RuleRegistry<L>) {
        use ObjectCreationCondition::*;
        use PropertyAccessCondition::*;

        ObjectCreationTracker::track(
            registry,
            &DESCRIPTOR,
            &[MESSAGE_HARDCODED_PASSWORD],
            vec![
                MatchConstructor(KnownType::NETWORK_CREDENTIAL),
                ArgumentAtIndexIs(1, KnownType::SYSTEM_STRING),
                ArgumentAtIndexIsConst(1),
            ],
        );
        ObjectCreationTracker::track(
            registry,
            &DESCRIPTOR,
            &[MESSAGE_HARDCODED_PASSWORD],
            vec![
                MatchConstructor(KnownType::PASSWORD_DERIVE_BYTES),
                ArgumentAtIndexIs(0, KnownType::SYSTEM_STRING),
                ArgumentAtIndexIsConst(0),
            ],
        );
        PropertyAccessTracker::track(
            registry,
            &DESCRIPTOR,
            &[MESSAGE_HARDCODED_PASSWORD],
            vec![
                MatchSetter,
                AssignedValueIsConstant,
                MatchProperty {
                    owner: KnownType::NETWORK_CREDENTIAL,
                    name: "Password",
                },
            ],
        );

        let words = Arc::clone(&self.words);
        let kinds = registry.language().credential_candidate_kinds();
        registry.register_node_action(&DESCRIPTOR, kinds, move |ctx| {
            let language = ctx.language();
            let node = ctx.node();
            let Some((name, value)) = language.assigned_name_and_value(node) else {
                return;
            };
            if !language.is_string_literal(value) {
                return;
            }
            let Some(text) = language.string_literal_value(value, ctx.model()) else {
                return;
            };

            if let Some(message) = credential_message(&words.get(), name, &text) {
                ctx.report(&DESCRIPTOR, node, &[message]);
            }
        });
    }
}
