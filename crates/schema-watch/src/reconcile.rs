//! Schema reconciliation.
//!
//! Brings a live database in line with a declared schema by creating missing
//! tables and adding missing columns. Nothing is ever dropped, renamed or
//! retyped, so running the reconciler again against the same declared schema
//! is a no-op.
//!
//! All DDL of a run executes inside a single transaction: either every table
//! reaches its declared shape or none of the run's changes persist.

use std::collections::BTreeSet;

use sqlx::AnyConnection;
use tracing::{debug, info, warn};

use crate::database::Database;
use crate::ddl;
use crate::dialect::Dialect;
use crate::error::{Result, WatchError};
use crate::introspect;
use crate::ordering::{order_tables, TableOrdering};
use crate::schema::TableSchema;

/// Options for a reconciliation run.
#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    /// Render PostgreSQL primary keys as identity columns instead of `SERIAL`.
    pub use_identity_columns: bool,
    /// Only process these tables.
    pub include_tables: Option<BTreeSet<String>>,
    /// Skip these tables (applied after `include_tables`).
    pub exclude_tables: Option<BTreeSet<String>>,
    /// Explicit dialect name (`sqlite` or `postgresql`) overriding detection
    /// from the connection URL.
    pub dialect_override: Option<String>,
    /// How tables are ordered before processing.
    pub ordering: TableOrdering,
    /// Build statements without executing them.
    pub dry_run: bool,
}

impl WatchOptions {
    /// Creates options with every default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables identity columns for PostgreSQL primary keys.
    #[must_use]
    pub const fn use_identity_columns(mut self, enabled: bool) -> Self {
        self.use_identity_columns = enabled;
        self
    }

    /// Restricts the run to the given tables.
    #[must_use]
    pub fn include<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_tables = Some(tables.into_iter().map(Into::into).collect());
        self
    }

    /// Excludes the given tables from the run.
    #[must_use]
    pub fn exclude<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_tables = Some(tables.into_iter().map(Into::into).collect());
        self
    }

    /// Overrides dialect detection.
    #[must_use]
    pub fn dialect(mut self, name: impl Into<String>) -> Self {
        self.dialect_override = Some(name.into());
        self
    }

    /// Sets the table ordering strategy.
    #[must_use]
    pub const fn ordering(mut self, ordering: TableOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Enables dry-run mode (statements are reported but not executed).
    #[must_use]
    pub const fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Returns whether `table` passes the include/exclude filters.
    #[must_use]
    pub fn selects(&self, table: &str) -> bool {
        let included = self
            .include_tables
            .as_ref()
            .is_none_or(|include| include.contains(table));
        let excluded = self
            .exclude_tables
            .as_ref()
            .is_some_and(|exclude| exclude.contains(table));
        included && !excluded
    }
}

/// What happened to one table during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOutcome {
    /// The table did not exist and was created.
    Created,
    /// The table existed and was missing the listed columns.
    Altered {
        /// Added columns, in declared order.
        added: Vec<String>,
    },
    /// The table already matched the declared schema.
    Unchanged,
}

/// Result of reconciling one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    /// Table name.
    pub name: String,
    /// What happened.
    pub outcome: TableOutcome,
    /// DDL emitted for the table (not executed in dry-run mode).
    pub statements: Vec<String>,
}

/// Result of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// The dialect that governed the run.
    pub dialect: Dialect,
    /// Whether the run was a dry run.
    pub dry_run: bool,
    /// Per-table results, in processing order.
    pub tables: Vec<TableReport>,
}

impl ReconcileReport {
    const fn empty(dialect: Dialect, dry_run: bool) -> Self {
        Self {
            dialect,
            dry_run,
            tables: Vec::new(),
        }
    }

    /// Gets the report for a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Returns processed table names in processing order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    /// Returns every statement of the run, in execution order.
    pub fn statements(&self) -> impl Iterator<Item = &str> {
        self.tables
            .iter()
            .flat_map(|t| t.statements.iter().map(String::as_str))
    }

    /// Returns whether the database already matched the declared schema.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.tables
            .iter()
            .all(|t| t.outcome == TableOutcome::Unchanged)
    }
}

/// Reconciles `tables` against the live database.
///
/// The dialect is resolved once from `options.dialect_override` or the
/// database URL. Tables are filtered, validated, ordered so referenced tables
/// come first, and then processed one by one inside a single transaction.
///
/// # Errors
///
/// - [`WatchError::UnsupportedDialect`] before anything touches the database.
/// - [`WatchError::InvalidIdentifier`] before the transaction is opened.
/// - [`WatchError::Introspection`] or [`WatchError::Execution`] after a
///   rollback of everything the run already applied.
pub async fn reconcile(
    db: &Database,
    tables: &[TableSchema],
    options: &WatchOptions,
) -> Result<ReconcileReport> {
    let dialect = Dialect::resolve(db.url(), options.dialect_override.as_deref())?;
    info!(dialect = %dialect, "Using dialect");

    if tables.is_empty() {
        warn!("No declared tables found, nothing to reconcile");
        return Ok(ReconcileReport::empty(dialect, options.dry_run));
    }

    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    info!(tables = ?names, "Tables detected");

    let selected: Vec<&TableSchema> = tables.iter().filter(|t| options.selects(&t.name)).collect();
    for table in &selected {
        ddl::validate_table(table)?;
    }
    let ordered = order_tables(&selected, options.ordering);

    if options.dry_run {
        warn!("Dry run mode - statements will be reported but not executed");
    }

    let mut tx = db.pool().begin().await?;

    match reconcile_tables(&mut *tx, &ordered, dialect, options).await {
        Ok(reports) => {
            if options.dry_run {
                tx.rollback().await?;
            } else {
                tx.commit().await?;
            }
            Ok(ReconcileReport {
                dialect,
                dry_run: options.dry_run,
                tables: reports,
            })
        }
        Err(e) => {
            warn!(error = %e, "Reconciliation failed, rolling back");
            if let Err(rollback_error) = tx.rollback().await {
                warn!(error = %rollback_error, "Rollback failed");
            }
            Err(e)
        }
    }
}

async fn reconcile_tables(
    conn: &mut AnyConnection,
    tables: &[&TableSchema],
    dialect: Dialect,
    options: &WatchOptions,
) -> Result<Vec<TableReport>> {
    let mut reports = Vec::with_capacity(tables.len());
    for table in tables {
        reports.push(reconcile_table(conn, table, dialect, options).await?);
    }
    Ok(reports)
}

async fn reconcile_table(
    conn: &mut AnyConnection,
    table: &TableSchema,
    dialect: Dialect,
    options: &WatchOptions,
) -> Result<TableReport> {
    // Read fresh every time: earlier tables of this run may have changed the schema
    if !introspect::table_exists(conn, &table.name, dialect).await? {
        let sql = ddl::build_create_table(table, dialect, options.use_identity_columns)?;
        execute(conn, &sql, options.dry_run).await?;
        info!(table = %table.name, "Table created");

        return Ok(TableReport {
            name: table.name.clone(),
            outcome: TableOutcome::Created,
            statements: vec![sql],
        });
    }

    let existing = introspect::existing_columns(conn, &table.name, dialect).await?;
    let added: Vec<String> = introspect::missing_columns(table, &existing)
        .into_iter()
        .map(String::from)
        .collect();

    if added.is_empty() {
        info!(table = %table.name, "Table verified (no changes)");
        return Ok(TableReport {
            name: table.name.clone(),
            outcome: TableOutcome::Unchanged,
            statements: Vec::new(),
        });
    }

    let missing: BTreeSet<String> = added.iter().cloned().collect();
    let statements = ddl::build_add_columns(table, &missing, dialect)?;
    for sql in &statements {
        execute(conn, sql, options.dry_run).await?;
    }
    info!(table = %table.name, added = added.len(), "Table updated");

    Ok(TableReport {
        name: table.name.clone(),
        outcome: TableOutcome::Altered { added },
        statements,
    })
}

async fn execute(conn: &mut AnyConnection, sql: &str, dry_run: bool) -> Result<()> {
    debug!(sql = %sql, "Executing SQL");
    if dry_run {
        return Ok(());
    }

    sqlx::query(sql)
        .execute(&mut *conn)
        .await
        .map_err(|source| WatchError::Execution {
            statement: sql.to_string(),
            source,
        })?;
    Ok(())
}
