//! Grammar kind enumerations and static kind groups

use std::fmt::Debug;
use std::hash::Hash;

/// A grammar's closed set of node and token kinds
pub trait SyntaxKind: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Parse the raw kind tag carried by a syntax node
    fn from_raw(raw: &str) -> Option<Self>;

    /// The raw kind tag
    fn as_str(self) -> &'static str;
}

/// Declares a grammar kind enum whose variant names are the raw kind tags.
macro_rules! syntax_kinds {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $($variant),*
        }

        impl $crate::syntax::SyntaxKind for $name {
            fn from_raw(raw: &str) -> Option<Self> {
                match raw {
                    $(stringify!($variant) => Some(Self::$variant),)*
                    _ => None,
                }
            }

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)*
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::syntax::SyntaxKind::as_str(*self))
            }
        }
    };
}

pub(crate) use syntax_kinds;

/// A static group of kinds sharing one meaning (e.g. every mutating expression)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSet<K: 'static> {
    kinds: &'static [K],
}

impl<K: SyntaxKind> KindSet<K> {
    pub const fn new(kinds: &'static [K]) -> Self {
        Self { kinds }
    }

    pub fn contains(&self, kind: K) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn as_slice(&self) -> &'static [K] {
        self.kinds
    }

    pub fn iter(&self) -> impl Iterator<Item = K> + 'static {
        self.kinds.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    syntax_kinds! {
        enum TestKind {
            Alpha,
            Beta,
            GammaToken,
        }
    }

    #[test]
    fn test_kind_round_trip_through_raw_tag() {
        assert_eq!(TestKind::from_raw("Beta"), Some(TestKind::Beta));
        assert_eq!(TestKind::GammaToken.as_str(), "GammaToken");
        assert_eq!(TestKind::from_raw("beta"), None);
        assert_eq!(TestKind::Alpha.to_string(), "Alpha");
    }

    #[test]
    fn test_kind_set_membership() {
        const SET: KindSet<TestKind> = KindSet::new(&[TestKind::Alpha, TestKind::GammaToken]);
        assert!(SET.contains(TestKind::Alpha));
        assert!(!SET.contains(TestKind::Beta));
        assert_eq!(SET.iter().count(), 2);
        assert!(!SET.is_empty());
    }
}
