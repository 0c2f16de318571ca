//! Live schema introspection.
//!
//! Reads table existence and column sets from the system catalogs. SQLite's
//! `PRAGMA table_info` cannot take a bound parameter, so table names are
//! validated before they are interpolated.
//!
//! Names are written unquoted, so both databases treat them case-insensitively
//! (PostgreSQL folds them to lowercase). Lookups and column comparisons ignore
//! ASCII case to match.

use std::collections::BTreeSet;

use sqlx::{AnyConnection, Row};
use tracing::debug;

use crate::database::Database;
use crate::dialect::Dialect;
use crate::error::{Result, WatchError};
use crate::ident::{self, IdentifierKind};
use crate::schema::TableSchema;

const SQLITE_TABLE_EXISTS: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ? COLLATE NOCASE";

const POSTGRES_TABLE_EXISTS: &str = "SELECT EXISTS (
    SELECT 1 FROM information_schema.tables
    WHERE table_schema = current_schema() AND table_name = lower($1)
)";

const POSTGRES_COLUMNS: &str = "SELECT column_name::text AS column_name
    FROM information_schema.columns
    WHERE table_schema = current_schema() AND table_name = lower($1)
    ORDER BY ordinal_position";

/// Returns whether `table` exists in the live database.
///
/// # Errors
///
/// Returns [`WatchError::InvalidIdentifier`] for an unsafe table name, or
/// [`WatchError::Introspection`] if the catalog query fails.
pub async fn table_exists(conn: &mut AnyConnection, table: &str, dialect: Dialect) -> Result<bool> {
    ident::validate(table, IdentifierKind::Table)?;

    let exists = match dialect {
        Dialect::Sqlite => sqlx::query(SQLITE_TABLE_EXISTS)
            .bind(table)
            .fetch_optional(&mut *conn)
            .await
            .map(|row| row.is_some()),
        Dialect::Postgres => sqlx::query(POSTGRES_TABLE_EXISTS)
            .bind(table)
            .fetch_one(&mut *conn)
            .await
            .and_then(|row| row.try_get::<bool, _>(0)),
    }
    .map_err(|source| introspection_error(table, source))?;

    debug!(table = %table, exists, "Checked table existence");
    Ok(exists)
}

/// Returns the names of the columns currently present in `table`, spelled as
/// the catalog stores them.
///
/// A missing table yields an empty set.
///
/// # Errors
///
/// Returns [`WatchError::InvalidIdentifier`] for an unsafe table name, or
/// [`WatchError::Introspection`] if the catalog query fails.
pub async fn existing_columns(
    conn: &mut AnyConnection,
    table: &str,
    dialect: Dialect,
) -> Result<BTreeSet<String>> {
    ident::validate(table, IdentifierKind::Table)?;

    let (rows, column) = match dialect {
        Dialect::Sqlite => {
            let pragma = format!("PRAGMA table_info({table})");
            (sqlx::query(&pragma).fetch_all(&mut *conn).await, "name")
        }
        Dialect::Postgres => (
            sqlx::query(POSTGRES_COLUMNS)
                .bind(table)
                .fetch_all(&mut *conn)
                .await,
            "column_name",
        ),
    };

    let columns = rows
        .and_then(|rows| {
            rows.iter()
                .map(|row| row.try_get::<String, _>(column))
                .collect::<std::result::Result<BTreeSet<_>, _>>()
        })
        .map_err(|source| introspection_error(table, source))?;

    debug!(table = %table, columns = ?columns, "Read existing columns");
    Ok(columns)
}

/// Current state of one declared table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSnapshot {
    /// Table name.
    pub name: String,
    /// Whether the table exists.
    pub exists: bool,
    /// Columns currently present (empty when the table is missing).
    pub columns: BTreeSet<String>,
}

impl TableSnapshot {
    /// Declared columns of `table` that are not present yet.
    #[must_use]
    pub fn missing_columns<'a>(&self, table: &'a TableSchema) -> Vec<&'a str> {
        missing_columns(table, &self.columns)
    }
}

/// Declared columns of `table` whose names, ignoring ASCII case, are not in
/// `existing`. Declared order is kept.
#[must_use]
pub fn missing_columns<'a>(table: &'a TableSchema, existing: &BTreeSet<String>) -> Vec<&'a str> {
    let existing: BTreeSet<String> = existing.iter().map(|c| c.to_ascii_lowercase()).collect();
    table
        .column_names()
        .filter(|name| !existing.contains(&name.to_ascii_lowercase()))
        .collect()
}

/// Reads the current state of every declared table without modifying the
/// database.
///
/// # Errors
///
/// Returns [`WatchError::InvalidIdentifier`] for an unsafe table name, or an
/// introspection/database error.
pub async fn snapshot(
    db: &Database,
    tables: &[TableSchema],
    dialect: Dialect,
) -> Result<Vec<TableSnapshot>> {
    let mut conn = db.pool().acquire().await?;
    let mut snapshots = Vec::with_capacity(tables.len());

    for table in tables {
        let exists = table_exists(&mut conn, &table.name, dialect).await?;
        let columns = if exists {
            existing_columns(&mut conn, &table.name, dialect).await?
        } else {
            BTreeSet::new()
        };
        snapshots.push(TableSnapshot {
            name: table.name.clone(),
            exists,
            columns,
        });
    }

    Ok(snapshots)
}

fn introspection_error(table: &str, source: sqlx::Error) -> WatchError {
    WatchError::Introspection {
        table: table.to_string(),
        source,
    }
}
