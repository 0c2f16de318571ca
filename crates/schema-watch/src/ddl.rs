//! DDL statement construction.
//!
//! Statements are built as plain text: schema DDL and catalog introspection
//! are not uniformly parameterizable across SQLite and PostgreSQL, so every
//! interpolated name goes through [`ident::validate`] and every type token
//! through [`ident::validate_type`] first.

use std::collections::BTreeSet;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::ident::{self, IdentifierKind};
use crate::schema::{ColumnSchema, TableSchema};

/// Validates a table name, its column names and types, and every foreign-key
/// target.
///
/// # Errors
///
/// Returns [`crate::WatchError::InvalidIdentifier`] for the first name that
/// is not a bare identifier or type token that is not safe to interpolate.
pub fn validate_table(table: &TableSchema) -> Result<()> {
    ident::validate(&table.name, IdentifierKind::Table)?;
    for column in &table.columns {
        validate_column(column)?;
    }
    Ok(())
}

fn validate_column(column: &ColumnSchema) -> Result<()> {
    ident::validate(&column.name, IdentifierKind::Column)?;
    ident::validate_type(&column.column_type.type_name())?;
    for fk in &column.foreign_keys {
        ident::validate(&fk.table, IdentifierKind::Table)?;
        ident::validate(&fk.column, IdentifierKind::Column)?;
    }
    Ok(())
}

/// Builds the `CREATE TABLE` statement for a declared table.
///
/// # Errors
///
/// Returns [`crate::WatchError::InvalidIdentifier`] if the table, a column, a
/// column type or a referenced name is unsafe.
pub fn build_create_table(
    table: &TableSchema,
    dialect: Dialect,
    use_identity_columns: bool,
) -> Result<String> {
    ident::validate(&table.name, IdentifierKind::Table)?;

    let ddl = dialect.ddl();
    let mut column_defs = Vec::with_capacity(table.columns.len());
    for column in &table.columns {
        validate_column(column)?;
        column_defs.push(ddl.column_definition(column, use_identity_columns));
    }

    Ok(format!(
        "CREATE TABLE {} ({})",
        table.name,
        column_defs.join(", ")
    ))
}

/// Builds one `ALTER TABLE ... ADD COLUMN` statement per declared column whose
/// name is in `missing`, in declared order.
///
/// # Errors
///
/// Returns [`crate::WatchError::InvalidIdentifier`] if the table or a missing
/// column's name or type is unsafe.
pub fn build_add_columns(
    table: &TableSchema,
    missing: &BTreeSet<String>,
    dialect: Dialect,
) -> Result<Vec<String>> {
    ident::validate(&table.name, IdentifierKind::Table)?;

    let ddl = dialect.ddl();
    table
        .columns
        .iter()
        .filter(|c| missing.contains(&c.name))
        .map(|column| {
            validate_column(column)?;
            Ok(format!(
                "ALTER TABLE {} ADD COLUMN {}",
                table.name,
                ddl.add_column_definition(column)
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WatchError;
    use crate::schema::ColumnType;

    fn users_table() -> TableSchema {
        TableSchema::new("users")
            .column(
                ColumnSchema::new("id", ColumnType::Integer)
                    .primary_key()
                    .auto_increment(),
            )
            .column(
                ColumnSchema::new("email", ColumnType::Text)
                    .not_null()
                    .unique(),
            )
            .column(ColumnSchema::new("password", ColumnType::Text).not_null())
    }

    #[test]
    fn test_create_table_sqlite() {
        let sql = build_create_table(&users_table(), Dialect::Sqlite, false).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, \
             email TEXT NOT NULL UNIQUE, password TEXT NOT NULL)"
        );
    }

    #[test]
    fn test_create_table_postgres_serial() {
        let sql = build_create_table(&users_table(), Dialect::Postgres, false).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE users (id SERIAL PRIMARY KEY, \
             email TEXT NOT NULL UNIQUE, password TEXT NOT NULL)"
        );
    }

    #[test]
    fn test_create_table_postgres_identity() {
        let sql = build_create_table(&users_table(), Dialect::Postgres, true).unwrap();
        assert!(sql.starts_with(
            "CREATE TABLE users (id INTEGER GENERATED ALWAYS AS IDENTITY PRIMARY KEY, "
        ));
        assert!(!sql.contains("SERIAL"));
    }

    #[test]
    fn test_create_table_with_reference() {
        let posts = TableSchema::new("posts")
            .column(ColumnSchema::new("id", ColumnType::Integer).primary_key())
            .column(ColumnSchema::new("user_id", ColumnType::Integer).references("users", "id"))
            .column(ColumnSchema::new("published", ColumnType::Boolean).not_null());

        let sql = build_create_table(&posts, Dialect::Sqlite, false).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE posts (id INTEGER PRIMARY KEY, \
             user_id INTEGER REFERENCES users (id), published INTEGER NOT NULL)"
        );
    }

    #[test]
    fn test_add_columns_in_declared_order() {
        let table = users_table().column(ColumnSchema::new("created_at", ColumnType::DateTime));
        let missing: BTreeSet<String> = ["created_at", "password"]
            .into_iter()
            .map(String::from)
            .collect();

        let statements = build_add_columns(&table, &missing, Dialect::Postgres).unwrap();
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE users ADD COLUMN password TEXT NOT NULL",
                "ALTER TABLE users ADD COLUMN created_at TIMESTAMP",
            ]
        );
    }

    #[test]
    fn test_add_columns_nothing_missing() {
        let statements =
            build_add_columns(&users_table(), &BTreeSet::new(), Dialect::Sqlite).unwrap();
        assert!(statements.is_empty());
    }

    #[test]
    fn test_invalid_table_name_rejected() {
        let table = TableSchema::new("1bad;drop")
            .column(ColumnSchema::new("id", ColumnType::Integer).primary_key());

        assert!(matches!(
            build_create_table(&table, Dialect::Sqlite, false),
            Err(WatchError::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            build_add_columns(&table, &BTreeSet::new(), Dialect::Sqlite),
            Err(WatchError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn test_invalid_column_name_rejected() {
        let table = TableSchema::new("users")
            .column(ColumnSchema::new("id", ColumnType::Integer).primary_key())
            .column(ColumnSchema::new("bad name", ColumnType::Text));
        let missing: BTreeSet<String> = std::iter::once("bad name".to_string()).collect();

        assert!(matches!(
            build_create_table(&table, Dialect::Postgres, false),
            Err(WatchError::InvalidIdentifier { ref name, .. }) if name == "bad name"
        ));
        assert!(matches!(
            build_add_columns(&table, &missing, Dialect::Postgres),
            Err(WatchError::InvalidIdentifier { ref name, .. }) if name == "bad name"
        ));
    }

    #[test]
    fn test_custom_type_carrying_sql_rejected() {
        let table = TableSchema::new("events")
            .column(ColumnSchema::new("id", ColumnType::Integer).primary_key())
            .column(ColumnSchema::new(
                "data",
                ColumnType::Custom("blob); drop table victims; --".into()),
            ));
        let missing: BTreeSet<String> = std::iter::once("data".to_string()).collect();

        assert!(matches!(
            validate_table(&table),
            Err(WatchError::InvalidIdentifier { kind: IdentifierKind::Type, .. })
        ));
        assert!(build_create_table(&table, Dialect::Sqlite, false).is_err());
        assert!(build_add_columns(&table, &missing, Dialect::Postgres).is_err());

        let sized = TableSchema::new("prices")
            .column(ColumnSchema::new("amount", ColumnType::Custom("decimal(10,2)".into())));
        assert_eq!(
            build_create_table(&sized, Dialect::Postgres, false).unwrap(),
            "CREATE TABLE prices (amount DECIMAL(10,2))"
        );
    }

    #[test]
    fn test_invalid_reference_rejected() {
        let table = TableSchema::new("posts")
            .column(ColumnSchema::new("user_id", ColumnType::Integer).references("users; --", "id"));

        assert!(validate_table(&table).is_err());
        assert!(build_create_table(&table, Dialect::Sqlite, false).is_err());
    }
}
