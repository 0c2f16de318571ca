//! PostgreSQL dialect.

use crate::schema::ColumnSchema;

use super::DdlDialect;

const TYPE_MAP: &[(&str, &str)] = &[
    ("VARCHAR", "VARCHAR"),
    ("TEXT", "TEXT"),
    ("BOOLEAN", "BOOLEAN"),
    ("INTEGER", "INTEGER"),
    ("DATETIME", "TIMESTAMP"),
    ("TIMESTAMP", "TIMESTAMP"),
    ("FLOAT", "FLOAT"),
    ("NUMERIC", "NUMERIC"),
    ("DATE", "DATE"),
    ("BIGINT", "BIGINT"),
    ("SMALLINT", "SMALLINT"),
];

/// PostgreSQL DDL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl DdlDialect for PostgresDialect {
    fn type_map(&self) -> &'static [(&'static str, &'static str)] {
        TYPE_MAP
    }

    fn primary_key_definition(&self, column: &ColumnSchema, use_identity_columns: bool) -> String {
        // Primary keys are always generated integers, whatever the declared type
        if use_identity_columns {
            format!("{} INTEGER GENERATED ALWAYS AS IDENTITY PRIMARY KEY", column.name)
        } else {
            format!("{} SERIAL PRIMARY KEY", column.name)
        }
    }
}
