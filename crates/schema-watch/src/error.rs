//! Error types for schema reconciliation.

use std::path::PathBuf;

use crate::ident::IdentifierKind;

/// Errors that can occur while reconciling a declared schema.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The dialect override is not supported, or the dialect cannot be
    /// inferred from the connection URL.
    #[error("Unsupported dialect: {0:?}")]
    UnsupportedDialect(String),

    /// A table or column name is not a bare SQL identifier, or a column type
    /// token is not a single word with an optional size suffix.
    #[error("Invalid {kind} name: {name:?}")]
    InvalidIdentifier {
        /// Whether the name belongs to a table, a column or a type.
        kind: IdentifierKind,
        /// The rejected name.
        name: String,
    },

    /// A query against the system catalogs failed.
    #[error("Failed to introspect table '{table}': {source}")]
    Introspection {
        /// The table being introspected.
        table: String,
        /// The underlying database error.
        #[source]
        source: sqlx::Error,
    },

    /// The database rejected a DDL statement.
    #[error("Failed to execute `{statement}`: {source}")]
    Execution {
        /// The rejected statement.
        statement: String,
        /// The underlying database error.
        #[source]
        source: sqlx::Error,
    },

    /// Connection, transaction begin or commit failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A schema manifest is structurally invalid.
    #[error("Invalid schema manifest '{path}': {message}")]
    Manifest {
        /// Path to the manifest file.
        path: PathBuf,
        /// What is wrong with it.
        message: String,
    },

    /// IO error (reading manifest files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for schema reconciliation.
pub type Result<T> = std::result::Result<T, WatchError>;
