//! schema-watch CLI
//!
//! Command-line tool for reconciling a JSON schema manifest against a live
//! database.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use schema_watch::ddl;
use schema_watch::introspect;
use schema_watch::manifest;
use schema_watch::ordering::order_tables;
use schema_watch::prelude::*;

/// Creates missing tables and columns from a declared schema.
#[derive(Parser)]
#[command(name = "schema-watch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (sqlite: or postgres:// connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3?mode=rwc")]
    database: String,

    /// Dialect override (sqlite or postgresql). Inferred from the URL if unset.
    #[arg(long, env = "DIALECT")]
    dialect: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing tables and add missing columns.
    Sync {
        /// Schema manifest (JSON).
        #[arg(short, long)]
        schema: PathBuf,

        /// Only reconcile these tables (repeatable).
        #[arg(short, long)]
        include: Vec<String>,

        /// Skip these tables (repeatable).
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Use identity columns instead of SERIAL for PostgreSQL primary keys.
        #[arg(long)]
        use_identity: bool,

        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,

        /// Table ordering strategy (topological or foreign-key-first).
        #[arg(long, default_value_t = TableOrdering::Topological)]
        ordering: TableOrdering,
    },

    /// Print CREATE TABLE statements for the manifest without connecting.
    Sql {
        /// Schema manifest (JSON).
        #[arg(short, long)]
        schema: PathBuf,

        /// Use identity columns instead of SERIAL for PostgreSQL primary keys.
        #[arg(long)]
        use_identity: bool,
    },

    /// Show which declared tables exist and their current columns.
    Inspect {
        /// Schema manifest (JSON).
        #[arg(short, long)]
        schema: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Sync {
            schema,
            include,
            exclude,
            use_identity,
            dry_run,
            ordering,
        } => {
            let tables = manifest::load(&schema)?;

            let mut options = WatchOptions::new()
                .use_identity_columns(use_identity)
                .ordering(ordering)
                .dry_run(dry_run);
            if !include.is_empty() {
                options = options.include(include);
            }
            if !exclude.is_empty() {
                options = options.exclude(exclude);
            }
            if let Some(dialect) = cli.dialect {
                options = options.dialect(dialect);
            }

            let db = Database::connect(&cli.database).await?;
            let report = reconcile(&db, &tables, &options).await?;
            db.close().await;

            print_report(&report);
        }

        Commands::Sql {
            schema,
            use_identity,
        } => {
            let tables = manifest::load(&schema)?;
            let dialect = Dialect::resolve(&cli.database, cli.dialect.as_deref())?;

            let declared: Vec<&TableSchema> = tables.iter().collect();
            for table in order_tables(&declared, TableOrdering::default()) {
                println!("{};", ddl::build_create_table(table, dialect, use_identity)?);
            }
        }

        Commands::Inspect { schema } => {
            let tables = manifest::load(&schema)?;
            let dialect = Dialect::resolve(&cli.database, cli.dialect.as_deref())?;

            let db = Database::connect(&cli.database).await?;
            let snapshots = introspect::snapshot(&db, &tables, dialect).await?;
            db.close().await;

            println!("\nDeclared tables ({dialect}):");
            println!("{:-<60}", "");
            for (table, snapshot) in tables.iter().zip(&snapshots) {
                if !snapshot.exists {
                    println!(" [ ] {}", snapshot.name);
                    continue;
                }

                let columns: Vec<&str> = snapshot.columns.iter().map(String::as_str).collect();
                println!(" [X] {} ({})", snapshot.name, columns.join(", "));

                let missing = snapshot.missing_columns(table);
                if !missing.is_empty() {
                    println!("     missing: {}", missing.join(", "));
                }
            }
            println!();
        }
    }

    Ok(())
}

fn print_report(report: &ReconcileReport) {
    if report.tables.is_empty() {
        info!("Nothing to reconcile.");
        return;
    }

    println!("\nReconciled tables ({}):", report.dialect);
    println!("{:-<60}", "");
    for table in &report.tables {
        match &table.outcome {
            TableOutcome::Created => println!(" [+] {}", table.name),
            TableOutcome::Altered { added } => {
                println!(" [~] {} (added: {})", table.name, added.join(", "));
            }
            TableOutcome::Unchanged => println!(" [=] {}", table.name),
        }
        if report.dry_run {
            for sql in &table.statements {
                println!("     {sql};");
            }
        }
    }
    println!();
}
