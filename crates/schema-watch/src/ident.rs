//! Bare identifier validation.
//!
//! Table and column names are interpolated directly into DDL text, since
//! neither SQLite nor PostgreSQL accepts bound parameters for identifiers.
//! Every name must pass [`validate`] and every column type token must pass
//! [`validate_type`] before it reaches a statement.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, WatchError};

static BARE_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid bare identifier regex")
});

// One word with an optional `(n)` or `(n,m)` suffix
static TYPE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\([0-9]+(, ?[0-9]+)?\))?$").expect("Invalid type token regex")
});

/// What a validated name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// A table name.
    Table,
    /// A column name.
    Column,
    /// A column type token.
    Type,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Column => write!(f, "column"),
            Self::Type => write!(f, "type"),
        }
    }
}

/// Returns whether `name` is a bare identifier: ASCII letters, digits and
/// underscores, not starting with a digit.
#[must_use]
pub fn is_bare_identifier(name: &str) -> bool {
    BARE_IDENTIFIER.is_match(name)
}

/// Validates a table or column name.
///
/// # Errors
///
/// Returns [`WatchError::InvalidIdentifier`] if `name` is not a bare
/// identifier.
pub fn validate(name: &str, kind: IdentifierKind) -> Result<()> {
    check(is_bare_identifier(name), name, kind)
}

/// Returns whether `token` is a safe column type: a single word, optionally
/// followed by `(n)` or `(n,m)`.
#[must_use]
pub fn is_type_token(token: &str) -> bool {
    TYPE_TOKEN.is_match(token)
}

/// Validates a column type token such as `INTEGER`, `VARCHAR(255)` or
/// `NUMERIC(10,2)`.
///
/// # Errors
///
/// Returns [`WatchError::InvalidIdentifier`] with [`IdentifierKind::Type`]
/// if `token` is anything else.
pub fn validate_type(token: &str) -> Result<()> {
    check(is_type_token(token), token, IdentifierKind::Type)
}

fn check(valid: bool, name: &str, kind: IdentifierKind) -> Result<()> {
    if valid {
        Ok(())
    } else {
        Err(WatchError::InvalidIdentifier {
            kind,
            name: name.to_string(),
        })
    }
}
