//! Named query views over soft-deletable tables.
//!
//! # Responsibility
//! - Define the active/deleted/global access paths shared by every
//!   repository read.
//! - Provide the bulk-restore escape hatch on the deleted view.
//!
//! # Invariants
//! - Ordinary reads default to the active view; the other views are opt-in,
//!   named access paths.
//! - Bulk restore is one UPDATE: it never cascades and never writes history.

use crate::repo::{RepoResult, NOW_MS_SQL};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use uuid::Uuid;

/// Named view over a soft-deletable table.
///
/// Passed explicitly to repository reads so callers cannot accidentally see
/// deleted rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scope {
    /// Rows with `is_deleted = 0`; the default for all ordinary reads.
    #[default]
    Active,
    /// Rows with `is_deleted = 1`.
    Deleted,
    /// All rows regardless of deletion state.
    Global,
}

impl Scope {
    /// Additional WHERE clause selecting this view.
    pub(crate) fn sql_clause(self) -> &'static str {
        match self {
            Self::Active => " AND is_deleted = 0",
            Self::Deleted => " AND is_deleted = 1",
            Self::Global => "",
        }
    }
}

/// Row filter for the bulk-restore operation on the deleted view.
///
/// The default filter matches every deleted row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreFilter {
    /// Restrict the restore to these ids; `None` restores all deleted rows.
    pub ids: Option<Vec<Uuid>>,
}

impl RestoreFilter {
    /// Filter matching only the given ids.
    pub fn ids(ids: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            ids: Some(ids.into_iter().collect()),
        }
    }
}

/// Clears the tombstone of every matching deleted row in one UPDATE.
///
/// Administrative escape hatch: does not cascade and does not create
/// history, asymmetric with the per-entity restore by design. Returns the
/// number of rows restored.
pub(crate) fn restore_deleted_rows(
    conn: &Connection,
    table: &'static str,
    filter: &RestoreFilter,
) -> RepoResult<usize> {
    let mut sql = format!(
        "UPDATE {table}
         SET
            is_deleted = 0,
            deleted_at = NULL,
            updated_at = {NOW_MS_SQL}
         WHERE is_deleted = 1"
    );
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(ids) = &filter.ids {
        if ids.is_empty() {
            return Ok(0);
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        sql.push_str(&format!(" AND uuid IN ({placeholders})"));
        for id in ids {
            bind_values.push(Value::Text(id.to_string()));
        }
    }

    sql.push(';');
    let restored = conn.execute(&sql, params_from_iter(bind_values))?;
    Ok(restored)
}
