//! JSON schema manifests.
//!
//! A manifest declares tables the same way the model layer would, for use
//! from the command line:
//!
//! ```json
//! { "tables": [ { "name": "users", "columns": [
//!   { "name": "id", "type": "integer", "primary_key": true, "auto_increment": true },
//!   { "name": "email", "type": "text", "nullable": false, "unique": true }
//! ] } ] }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, WatchError};
use crate::schema::{ColumnSchema, ColumnType, ForeignKeyRef, TableSchema};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    tables: Vec<TableEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableEntry {
    name: String,
    #[serde(default)]
    columns: Vec<ColumnEntry>,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ColumnEntry {
    name: String,
    #[serde(rename = "type")]
    column_type: String,
    #[serde(default)]
    length: Option<u32>,
    #[serde(default = "default_nullable")]
    nullable: bool,
    #[serde(default)]
    primary_key: bool,
    #[serde(default)]
    unique: bool,
    #[serde(default)]
    auto_increment: bool,
    #[serde(default)]
    references: Vec<ForeignKeyRef>,
}

const fn default_nullable() -> bool {
    true
}

impl From<ColumnEntry> for ColumnSchema {
    fn from(entry: ColumnEntry) -> Self {
        let mut column = Self::new(entry.name, ColumnType::parse(&entry.column_type, entry.length));
        column.nullable = entry.nullable;
        column.unique = entry.unique;
        column.auto_increment = entry.auto_increment;
        column.foreign_keys = entry.references;
        if entry.primary_key {
            column = column.primary_key();
        }
        column
    }
}

/// Loads declared tables from a manifest file.
///
/// # Errors
///
/// Returns [`WatchError::Io`] if the file cannot be read, or
/// [`WatchError::Manifest`] if it is not a valid manifest.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<TableSchema>> {
    let path = path.as_ref();
    let invalid = |message: String| WatchError::Manifest {
        path: path.to_path_buf(),
        message,
    };

    let content = fs::read_to_string(path)?;
    let manifest: Manifest = serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
    into_tables(manifest).map_err(invalid)
}

/// Parses declared tables from manifest JSON.
///
/// Identifier safety is not checked here; the reconciler does that before
/// touching the database.
///
/// # Errors
///
/// Returns [`WatchError::Serialization`] for malformed JSON, or
/// [`WatchError::Manifest`] if a table or column name is declared twice.
pub fn parse(json: &str) -> Result<Vec<TableSchema>> {
    let manifest: Manifest = serde_json::from_str(json)?;
    into_tables(manifest).map_err(|message| WatchError::Manifest {
        path: PathBuf::new(),
        message,
    })
}

fn into_tables(manifest: Manifest) -> std::result::Result<Vec<TableSchema>, String> {
    let mut seen_tables = HashSet::new();
    let mut tables = Vec::with_capacity(manifest.tables.len());
    for entry in manifest.tables {
        // Unquoted names are case-insensitive in both databases
        if !seen_tables.insert(entry.name.to_ascii_lowercase()) {
            return Err(format!("table '{}' is declared twice", entry.name));
        }

        let mut seen_columns = HashSet::new();
        let mut table = TableSchema::new(entry.name);
        for column in entry.columns {
            if !seen_columns.insert(column.name.to_ascii_lowercase()) {
                return Err(format!(
                    "column '{}.{}' is declared twice",
                    table.name, column.name
                ));
            }
            table = table.column(column.into());
        }
        tables.push(table);
    }

    Ok(tables)
}
