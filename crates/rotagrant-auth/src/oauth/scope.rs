//! OAuth 2.0 scope sets.
//!
//! Scopes travel over the wire as a single space-delimited string
//! (RFC 6749 Section 3.3). [`ScopeSet`] is the parsed form used for the
//! subset check that keeps a refreshed token from escalating privileges.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A set of scope names.
///
/// Equality ignores order. Iteration and [`Display`](fmt::Display) follow the
/// order in which scopes were first seen, so the canonical string of a parsed
/// value is stable.
///
/// # Examples
///
/// ```
/// use rotagrant_auth::oauth::ScopeSet;
///
/// let granted = ScopeSet::parse("read write admin");
/// let requested = ScopeSet::parse("write  read read");
///
/// assert!(requested.is_subset_of(&granted));
/// assert_eq!(requested.to_string(), "write read");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSet {
    scopes: IndexSet<String>,
}

impl ScopeSet {
    /// Creates an empty scope set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a space-delimited scope string.
    ///
    /// Splits on any whitespace and drops duplicates. Blank input yields an
    /// empty set.
    #[must_use]
    pub fn parse(scope_string: &str) -> Self {
        scope_string.split_whitespace().collect()
    }

    /// Returns `true` if every scope in `self` is also in `other`.
    ///
    /// The empty set is a subset of every set.
    #[must_use]
    pub fn is_subset_of(&self, other: &ScopeSet) -> bool {
        self.scopes.is_subset(&other.scopes)
    }

    /// Returns `true` if the set contains `scope`.
    #[must_use]
    pub fn contains(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    /// Number of distinct scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns `true` if the set holds no scopes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Iterates over scope names in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }
}

impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, scope) in self.scopes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(scope)?;
        }
        Ok(())
    }
}

impl FromStr for ScopeSet {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl<S: Into<String>> FromIterator<S> for ScopeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            scopes: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl Serialize for ScopeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScopeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}
