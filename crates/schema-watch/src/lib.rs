//! Declarative schema reconciliation for SQLite and PostgreSQL.
//!
//! `schema-watch` compares the tables an application declares against the
//! live database and applies the minimal additive DDL to close the gap:
//! - Missing tables are created, referenced tables first
//! - Missing columns are added with `ALTER TABLE ... ADD COLUMN`
//! - Existing tables and columns are never dropped, renamed or retyped
//!
//! Every run executes inside one transaction and is idempotent.
//!
//! # Architecture
//!
//! - **Dialect** - Dialect resolution, type translation and column syntax
//! - **Introspect** - Table existence and column sets from the system catalogs
//! - **DDL** - `CREATE TABLE` and `ADD COLUMN` statement construction
//! - **Ordering** - Foreign-key aware table ordering
//! - **Reconcile** - The transactional run tying everything together
//! - **Manifest** - Declared tables from JSON for the CLI
//!
//! # Example
//!
//! ```rust,ignore
//! use schema_watch::prelude::*;
//!
//! let users = TableSchema::new("users")
//!     .column(ColumnSchema::new("id", ColumnType::Integer).primary_key().auto_increment())
//!     .column(ColumnSchema::new("email", ColumnType::Text).not_null().unique())
//!     .column(ColumnSchema::new("password", ColumnType::Text).not_null());
//!
//! let db = Database::connect("sqlite:app.db?mode=rwc").await?;
//! let report = reconcile(&db, &[users], &WatchOptions::default()).await?;
//! assert_eq!(report.dialect, Dialect::Sqlite);
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Create missing tables and columns
//! schema-watch --database sqlite:app.db?mode=rwc sync --schema schema.json
//!
//! # Print CREATE TABLE statements without connecting
//! schema-watch --dialect postgresql sql --schema schema.json
//!
//! # Show what currently exists
//! schema-watch inspect --schema schema.json
//! ```

pub mod database;
pub mod ddl;
pub mod dialect;
pub mod error;
pub mod ident;
pub mod introspect;
pub mod manifest;
pub mod ordering;
pub mod reconcile;
pub mod schema;

pub use error::{Result, WatchError};
pub use reconcile::reconcile;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::database::Database;
    pub use crate::dialect::{DdlDialect, Dialect};
    pub use crate::error::{Result, WatchError};
    pub use crate::ident::IdentifierKind;
    pub use crate::introspect::TableSnapshot;
    pub use crate::ordering::TableOrdering;
    pub use crate::reconcile::{
        reconcile, ReconcileReport, TableOutcome, TableReport, WatchOptions,
    };
    pub use crate::schema::{ColumnSchema, ColumnType, ForeignKeyRef, TableSchema};
}
