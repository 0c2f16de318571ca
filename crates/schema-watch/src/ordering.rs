//! Table ordering for foreign-key dependencies.
//!
//! Tables must be created after the tables they reference. Two strategies are
//! provided: the simple "tables without foreign keys first" heuristic, and a
//! topological sort over foreign-key edges that uses the heuristic to break
//! ties.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::schema::TableSchema;

/// How declared tables are ordered before reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableOrdering {
    /// Kahn topological sort over foreign-key edges between declared tables.
    /// Ready tables are taken in [`TableOrdering::ForeignKeyFirst`] order.
    #[default]
    Topological,
    /// Tables without foreign keys first, then by name. Multi-hop chains
    /// between tables that both carry foreign keys may come out in the wrong
    /// order.
    ForeignKeyFirst,
}

impl FromStr for TableOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "topological" => Ok(Self::Topological),
            "foreign-key-first" | "foreign_key_first" | "fk-first" => Ok(Self::ForeignKeyFirst),
            other => Err(format!("unknown table ordering: {other}")),
        }
    }
}

impl fmt::Display for TableOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topological => write!(f, "topological"),
            Self::ForeignKeyFirst => write!(f, "foreign-key-first"),
        }
    }
}

/// Orders `tables` so referenced tables come before the tables that
/// reference them.
#[must_use]
pub fn order_tables<'a>(tables: &[&'a TableSchema], ordering: TableOrdering) -> Vec<&'a TableSchema> {
    let mut sorted = tables.to_vec();
    sorted.sort_by(|a, b| {
        (a.has_foreign_keys(), a.name.as_str()).cmp(&(b.has_foreign_keys(), b.name.as_str()))
    });

    match ordering {
        TableOrdering::ForeignKeyFirst => sorted,
        TableOrdering::Topological => topological(sorted),
    }
}

fn topological(mut remaining: Vec<&TableSchema>) -> Vec<&TableSchema> {
    // Table names are matched without regard to ASCII case
    let declared: HashSet<String> = remaining.iter().map(|t| t.name.to_ascii_lowercase()).collect();
    let mut placed: HashSet<String> = HashSet::with_capacity(remaining.len());
    let mut ordered = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        // `remaining` stays in heuristic order, so the first ready table wins ties
        let ready = remaining.iter().position(|table| {
            table
                .referenced_tables()
                .map(str::to_ascii_lowercase)
                .all(|dep| placed.contains(&dep) || !declared.contains(&dep))
        });

        let Some(index) = ready else {
            let cycle: Vec<&str> = remaining.iter().copied().map(|t| t.name.as_str()).collect();
            warn!(tables = ?cycle, "Foreign-key cycle detected, keeping heuristic order");
            ordered.append(&mut remaining);
            break;
        };

        let table = remaining.remove(index);
        placed.insert(table.name.to_ascii_lowercase());
        ordered.push(table);
    }

    ordered
}
