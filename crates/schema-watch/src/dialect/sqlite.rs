//! SQLite dialect.
//!
//! SQLite uses type affinity, so most logical types collapse to `TEXT`,
//! `INTEGER` or `REAL`.

use crate::schema::ColumnSchema;

use super::DdlDialect;

const TYPE_MAP: &[(&str, &str)] = &[
    ("VARCHAR", "TEXT"),
    ("TEXT", "TEXT"),
    ("BOOLEAN", "INTEGER"), // stored as 0/1
    ("INTEGER", "INTEGER"),
    ("DATETIME", "TEXT"),
    ("TIMESTAMP", "TEXT"),
    ("FLOAT", "REAL"),
    ("NUMERIC", "NUMERIC"),
    ("DATE", "TEXT"),
    ("BIGINT", "INTEGER"),
    ("SMALLINT", "INTEGER"),
];

/// SQLite DDL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl DdlDialect for SqliteDialect {
    fn type_map(&self) -> &'static [(&'static str, &'static str)] {
        TYPE_MAP
    }

    fn primary_key_definition(&self, column: &ColumnSchema, _use_identity_columns: bool) -> String {
        let sql_type = self.translate_type(&column.column_type.type_name());

        // Only an INTEGER PRIMARY KEY can be a rowid alias with AUTOINCREMENT
        if column.auto_increment && sql_type.to_ascii_uppercase().starts_with("INTEGER") {
            format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", column.name)
        } else {
            format!("{} {} PRIMARY KEY", column.name, sql_type)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;

    #[test]
    fn test_type_translation() {
        let dialect = SqliteDialect;
        assert_eq!(dialect.translate_type("VARCHAR"), "TEXT");
        assert_eq!(dialect.translate_type("BOOLEAN"), "INTEGER");
        assert_eq!(dialect.translate_type("FLOAT"), "REAL");
        assert_eq!(dialect.translate_type("DATETIME"), "TEXT");
        assert_eq!(dialect.translate_type("BIGINT"), "INTEGER");
        assert_eq!(dialect.translate_type("NUMERIC"), "NUMERIC");
    }

    #[test]
    fn test_autoincrement_primary_key() {
        let id = ColumnSchema::new("id", ColumnType::Integer)
            .primary_key()
            .auto_increment();
        assert_eq!(
            SqliteDialect.column_definition(&id, false),
            "id INTEGER PRIMARY KEY AUTOINCREMENT"
        );

        // BIGINT translates to INTEGER, so it can still autoincrement
        let id = ColumnSchema::new("id", ColumnType::BigInt)
            .primary_key()
            .auto_increment();
        assert_eq!(
            SqliteDialect.column_definition(&id, true),
            "id INTEGER PRIMARY KEY AUTOINCREMENT"
        );
    }

    #[test]
    fn test_plain_primary_key() {
        let id = ColumnSchema::new("id", ColumnType::Integer).primary_key();
        assert_eq!(SqliteDialect.column_definition(&id, false), "id INTEGER PRIMARY KEY");

        let code = ColumnSchema::new("code", ColumnType::Varchar(Some(8)))
            .primary_key()
            .auto_increment();
        assert_eq!(
            SqliteDialect.column_definition(&code, false),
            "code TEXT PRIMARY KEY"
        );
    }
}
