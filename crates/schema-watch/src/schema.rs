//! Declared schema types.
//!
//! These types describe the tables the application expects to exist. They are
//! produced by the model layer (or loaded from a manifest) and are read-only
//! to the reconciler.

use serde::{Deserialize, Serialize};

/// Logical column types understood by the type translator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Unbounded text.
    Text,
    /// Variable-length character string with optional max length.
    Varchar(Option<u32>),
    /// Boolean.
    Boolean,
    /// Integer (32-bit).
    Integer,
    /// Floating point.
    Float,
    /// Fixed-point numeric.
    Numeric,
    /// Date only.
    Date,
    /// Date and time.
    DateTime,
    /// Timestamp.
    Timestamp,
    /// Big integer (64-bit).
    BigInt,
    /// Small integer (16-bit).
    SmallInt,
    /// Any other type name, passed through translation unchanged.
    Custom(String),
}

impl ColumnType {
    /// Returns the normalized uppercase type token, e.g. `VARCHAR(255)`.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::Text => "TEXT".to_string(),
            Self::Varchar(None) => "VARCHAR".to_string(),
            Self::Varchar(Some(len)) => format!("VARCHAR({len})"),
            Self::Boolean => "BOOLEAN".to_string(),
            Self::Integer => "INTEGER".to_string(),
            Self::Float => "FLOAT".to_string(),
            Self::Numeric => "NUMERIC".to_string(),
            Self::Date => "DATE".to_string(),
            Self::DateTime => "DATETIME".to_string(),
            Self::Timestamp => "TIMESTAMP".to_string(),
            Self::BigInt => "BIGINT".to_string(),
            Self::SmallInt => "SMALLINT".to_string(),
            Self::Custom(name) => name.trim().to_uppercase(),
        }
    }

    /// Parses a logical type name as written in a manifest.
    ///
    /// Unknown names become [`ColumnType::Custom`]. `length` only applies to
    /// `varchar`.
    #[must_use]
    pub fn parse(name: &str, length: Option<u32>) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" | "str" | "string" => Self::Text,
            "varchar" => Self::Varchar(length),
            "boolean" | "bool" => Self::Boolean,
            "integer" | "int" => Self::Integer,
            "float" | "real" | "double" => Self::Float,
            "numeric" | "decimal" => Self::Numeric,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            "timestamp" => Self::Timestamp,
            "bigint" => Self::BigInt,
            "smallint" => Self::SmallInt,
            _ => Self::Custom(name.trim().to_string()),
        }
    }
}

/// An outgoing foreign-key reference from a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    /// Referenced table.
    pub table: String,
    /// Referenced column.
    pub column: String,
}

impl ForeignKeyRef {
    /// Creates a reference to `table.column`.
    #[must_use]
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// Declared definition of a column.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Logical type.
    pub column_type: ColumnType,
    /// Whether the column allows NULL values.
    pub nullable: bool,
    /// Whether this column is the primary key.
    pub primary_key: bool,
    /// Whether this column has a UNIQUE constraint.
    pub unique: bool,
    /// Whether this column auto-increments.
    pub auto_increment: bool,
    /// Outgoing foreign-key references.
    pub foreign_keys: Vec<ForeignKeyRef>,
}

impl ColumnSchema {
    /// Creates a new nullable column.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            primary_key: false,
            unique: false,
            auto_increment: false,
            foreign_keys: Vec::new(),
        }
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the column as the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false; // Primary keys are always NOT NULL
        self
    }

    /// Sets the column to auto-increment.
    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets the column as unique.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Adds a foreign-key reference to `table.column`.
    #[must_use]
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_keys.push(ForeignKeyRef::new(table, column));
        self
    }
}

/// Declared definition of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Column definitions, in declared order.
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// Creates a new table schema with no columns.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Adds a column to the table.
    #[must_use]
    pub fn column(mut self, column: ColumnSchema) -> Self {
        self.columns.push(column);
        self
    }

    /// Gets a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns whether any column references another table.
    #[must_use]
    pub fn has_foreign_keys(&self) -> bool {
        self.columns.iter().any(|c| !c.foreign_keys.is_empty())
    }

    /// Returns the names of the tables this table references, excluding
    /// itself.
    pub fn referenced_tables(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .flat_map(|c| c.foreign_keys.iter())
            .map(|fk| fk.table.as_str())
            .filter(move |t| !t.eq_ignore_ascii_case(&self.name))
    }

    /// Returns column names in declared order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}
