//! Database dialects.
//!
//! A reconciliation run is governed by exactly one [`Dialect`], resolved once
//! from an explicit override or the connection URL. Each dialect knows how to
//! translate logical type names and render column definitions.

mod postgres;
mod sqlite;

pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WatchError};
use crate::schema::ColumnSchema;

static SQLITE: SqliteDialect = SqliteDialect;
static POSTGRES: PostgresDialect = PostgresDialect;

/// The SQL dialect governing a reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// SQLite.
    Sqlite,
    /// PostgreSQL.
    Postgres,
}

impl Dialect {
    /// Resolves the dialect for a run.
    ///
    /// A non-empty `dialect_override` wins and must name a supported dialect.
    /// Otherwise the dialect is inferred from the URL scheme.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::UnsupportedDialect`] if the override is not
    /// `sqlite` or `postgresql`, or if the URL scheme is not recognized.
    pub fn resolve(url: &str, dialect_override: Option<&str>) -> Result<Self> {
        dialect_override
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(
                || {
                    Self::from_url(url).ok_or_else(|| {
                        let scheme = url.split(':').next().unwrap_or_default();
                        WatchError::UnsupportedDialect(scheme.to_string())
                    })
                },
                str::parse::<Self>,
            )
    }

    /// Infers the dialect from a connection URL's scheme prefix.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let url = url.trim_start().to_ascii_lowercase();
        if url.starts_with("sqlite") {
            Some(Self::Sqlite)
        } else if url.starts_with("postgres") {
            // Covers both postgres:// and postgresql://
            Some(Self::Postgres)
        } else {
            None
        }
    }

    /// Returns the canonical dialect name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgresql",
        }
    }

    /// Returns the DDL renderer for this dialect.
    #[must_use]
    pub fn ddl(self) -> &'static dyn DdlDialect {
        match self {
            Self::Sqlite => &SQLITE,
            Self::Postgres => &POSTGRES,
        }
    }

    /// Translates a logical type token to this dialect's DDL type.
    #[must_use]
    pub fn translate_type(self, logical: &str) -> String {
        self.ddl().translate_type(logical)
    }
}

impl FromStr for Dialect {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "postgresql" | "postgres" => Ok(Self::Postgres),
            _ => Err(WatchError::UnsupportedDialect(s.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for dialect-specific DDL rendering.
///
/// Names and custom type tokens passed to these methods must already be
/// validated with [`crate::ident`]; rendering never quotes or escapes them.
pub trait DdlDialect: Send + Sync {
    /// Ordered `(substring, target type)` pairs used by
    /// [`DdlDialect::translate_type`]. The first key contained in the logical
    /// type wins.
    fn type_map(&self) -> &'static [(&'static str, &'static str)];

    /// Translates a logical type token, falling back to the token itself when
    /// no key matches.
    #[must_use]
    fn translate_type(&self, logical: &str) -> String {
        self.type_map()
            .iter()
            .find(|(key, _)| logical.contains(key))
            .map_or_else(|| logical.to_string(), |(_, target)| (*target).to_string())
    }

    /// Renders the definition of a primary-key column.
    #[must_use]
    fn primary_key_definition(&self, column: &ColumnSchema, use_identity_columns: bool) -> String;

    /// Renders a column definition for `CREATE TABLE`.
    #[must_use]
    fn column_definition(&self, column: &ColumnSchema, use_identity_columns: bool) -> String {
        if column.primary_key {
            return self.primary_key_definition(column, use_identity_columns);
        }

        let mut parts = self.column_parts(column);
        for fk in &column.foreign_keys {
            parts.push(format!("REFERENCES {} ({})", fk.table, fk.column));
        }
        parts.join(" ")
    }

    /// Renders a column definition for `ALTER TABLE ... ADD COLUMN`.
    #[must_use]
    fn add_column_definition(&self, column: &ColumnSchema) -> String {
        self.column_parts(column).join(" ")
    }

    /// Name, translated type and the `NOT NULL` / `UNIQUE` constraints shared
    /// by both statement kinds.
    #[must_use]
    fn column_parts(&self, column: &ColumnSchema) -> Vec<String> {
        let mut parts = vec![
            column.name.clone(),
            self.translate_type(&column.column_type.type_name()),
        ];
        if !column.nullable {
            parts.push("NOT NULL".to_string());
        }
        if column.unique {
            parts.push("UNIQUE".to_string());
        }
        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;

    #[test]
    fn override_wins_over_url() {
        assert_eq!(
            Dialect::resolve("sqlite::memory:", Some("postgresql")).unwrap(),
            Dialect::Postgres
        );
        assert_eq!(
            Dialect::resolve("postgres://localhost/db", Some(" SQLite ")).unwrap(),
            Dialect::Sqlite
        );
    }

    #[test]
    fn empty_override_falls_back_to_url() {
        assert_eq!(
            Dialect::resolve("sqlite:app.db", Some("")).unwrap(),
            Dialect::Sqlite
        );
        assert_eq!(
            Dialect::resolve("postgresql://localhost/app", None).unwrap(),
            Dialect::Postgres
        );
        assert_eq!(
            Dialect::resolve("postgres://localhost/app", None).unwrap(),
            Dialect::Postgres
        );
    }

    #[test]
    fn unsupported_override_fails() {
        let err = Dialect::resolve("sqlite::memory:", Some("mysql")).unwrap_err();
        assert!(matches!(err, WatchError::UnsupportedDialect(ref d) if d == "mysql"));
    }

    #[test]
    fn unknown_scheme_fails() {
        let err = Dialect::resolve("mysql://localhost/app", None).unwrap_err();
        assert!(matches!(err, WatchError::UnsupportedDialect(ref d) if d == "mysql"));
    }

    #[test]
    fn display_uses_canonical_name() {
        assert_eq!(Dialect::Sqlite.to_string(), "sqlite");
        assert_eq!(Dialect::Postgres.to_string(), "postgresql");
    }

    #[test]
    fn translation_is_substring_based() {
        assert_eq!(Dialect::Sqlite.translate_type("VARCHAR(255)"), "TEXT");
        assert_eq!(Dialect::Postgres.translate_type("VARCHAR(255)"), "VARCHAR");
        assert_eq!(Dialect::Postgres.translate_type("DATETIME"), "TIMESTAMP");
        assert_eq!(Dialect::Sqlite.translate_type("DATETIME"), "TEXT");
    }

    #[test]
    fn unknown_types_pass_through() {
        assert_eq!(Dialect::Sqlite.translate_type("JSONB"), "JSONB");
        assert_eq!(Dialect::Postgres.translate_type("UUID"), "UUID");
        assert_eq!(Dialect::Postgres.translate_type(""), "");
    }

    #[test]
    fn translation_is_deterministic() {
        for dialect in [Dialect::Sqlite, Dialect::Postgres] {
            for logical in ["TEXT", "BOOLEAN", "FLOAT", "SMALLINT", "XML"] {
                assert_eq!(
                    dialect.translate_type(logical),
                    dialect.translate_type(logical)
                );
            }
        }
    }

    #[test]
    fn add_column_definition_keeps_constraints() {
        let column = ColumnSchema::new("email", ColumnType::Text)
            .not_null()
            .unique();
        assert_eq!(
            Dialect::Sqlite.ddl().add_column_definition(&column),
            "email TEXT NOT NULL UNIQUE"
        );
    }

    #[test]
    fn create_definition_renders_references() {
        let column = ColumnSchema::new("author_id", ColumnType::Integer)
            .not_null()
            .references("users", "id");
        assert_eq!(
            Dialect::Postgres.ddl().column_definition(&column, false),
            "author_id INTEGER NOT NULL REFERENCES users (id)"
        );
    }
}
