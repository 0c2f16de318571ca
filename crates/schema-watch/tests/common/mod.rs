#![allow(dead_code)]

use std::collections::BTreeSet;

use schema_watch::prelude::*;
use tempfile::TempDir;

/// A file-backed SQLite database that lives as long as its directory.
pub struct TestDb {
    pub db: Database,
    _dir: TempDir,
}

pub async fn sqlite_db() -> TestDb {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
    let db = Database::connect(&url)
        .await
        .unwrap_or_else(|e| panic!("Failed to open {url}: {e}"));
    TestDb { db, _dir: dir }
}

pub async fn execute(db: &Database, sql: &str) {
    sqlx::query(sql)
        .execute(db.pool())
        .await
        .unwrap_or_else(|e| panic!("Failed to execute: {sql}\nError: {e}"));
}

pub async fn table_exists(db: &Database, table: &str) -> bool {
    let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");
    schema_watch::introspect::table_exists(&mut conn, table, Dialect::Sqlite)
        .await
        .expect("Failed to check table existence")
}

pub async fn columns(db: &Database, table: &str) -> BTreeSet<String> {
    let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");
    schema_watch::introspect::existing_columns(&mut conn, table, Dialect::Sqlite)
        .await
        .expect("Failed to read columns")
}

pub fn users_table() -> TableSchema {
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
