//! History-record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist audit records and serve their read paths.
//!
//! # Invariants
//! - No update or delete API: history is append-only through this layer, and
//!   the management surface over it is read-only.
//! - Subject listing order is deterministic: `created_at ASC, uuid ASC`.

use crate::model::history::HistoryRecord;
use crate::model::subject::{EntityRef, SubjectRef};
use crate::repo::scope::Scope;
use crate::repo::{
    bool_to_int, ensure_connection_ready, lifecycle_from_row, parse_optional_uuid, parse_uuid,
    RepoError, RepoResult, NOW_MS_SQL,
};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const HISTORY_SELECT_SQL: &str = "SELECT
    uuid,
    description,
    actor_id,
    subject_kind,
    subject_id,
    created_at,
    updated_at,
    is_deleted,
    deleted_at
FROM history_records";

const HISTORY_COLUMNS: &[&str] = &[
    "uuid",
    "description",
    "actor_id",
    "subject_kind",
    "subject_id",
    "created_at",
    "updated_at",
    "is_deleted",
    "deleted_at",
];

/// Repository interface for audit records.
pub trait HistoryRepository {
    /// Persists one record and returns its stable id.
    fn create(&self, record: &HistoryRecord) -> RepoResult<Uuid>;
    /// Gets one record by id within the given view.
    fn get(&self, id: Uuid, scope: Scope) -> RepoResult<Option<HistoryRecord>>;
    /// Lists records within the given view, oldest first.
    fn list(&self, scope: Scope) -> RepoResult<Vec<HistoryRecord>>;
    /// Lists the records attached to one subject, oldest first.
    fn list_for_subject(&self, subject: &EntityRef, scope: Scope)
        -> RepoResult<Vec<HistoryRecord>>;
}

/// SQLite-backed history repository.
pub struct SqliteHistoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHistoryRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "history_records", HISTORY_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl HistoryRepository for SqliteHistoryRepository<'_> {
    fn create(&self, record: &HistoryRecord) -> RepoResult<Uuid> {
        self.conn.execute(
            &format!(
                "INSERT INTO history_records (
                    uuid,
                    description,
                    actor_id,
                    subject_kind,
                    subject_id,
                    created_at,
                    updated_at,
                    is_deleted,
                    deleted_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, {NOW_MS_SQL}), {NOW_MS_SQL}, ?7, ?8);"
            ),
            params![
                record.uuid.to_string(),
                record.description.as_str(),
                record.actor_id.map(|id| id.to_string()),
                record.subject.kind.as_deref(),
                record.subject.id.map(|id| id.to_string()),
                record.lifecycle.created_at,
                bool_to_int(record.lifecycle.is_deleted),
                record.lifecycle.deleted_at,
            ],
        )?;

        Ok(record.uuid)
    }

    fn get(&self, id: Uuid, scope: Scope) -> RepoResult<Option<HistoryRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{HISTORY_SELECT_SQL}
             WHERE uuid = ?1{};",
            scope.sql_clause()
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_history_row(row)?));
        }

        Ok(None)
    }

    fn list(&self, scope: Scope) -> RepoResult<Vec<HistoryRecord>> {
        let sql = format!(
            "{HISTORY_SELECT_SQL}
             WHERE 1 = 1{}
             ORDER BY created_at ASC, uuid ASC;",
            scope.sql_clause()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_history_row(row)?);
        }
        Ok(records)
    }

    fn list_for_subject(
        &self,
        subject: &EntityRef,
        scope: Scope,
    ) -> RepoResult<Vec<HistoryRecord>> {
        let sql = format!(
            "{HISTORY_SELECT_SQL}
             WHERE subject_kind = ?1
               AND subject_id = ?2{}
             ORDER BY created_at ASC, uuid ASC;",
            scope.sql_clause()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![subject.kind.as_str(), subject.id.to_string()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_history_row(row)?);
        }
        Ok(records)
    }
}

fn parse_history_row(row: &Row<'_>) -> RepoResult<HistoryRecord> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "history_records.uuid")?;
    let context = format!("history_records.uuid={uuid_text}");

    let actor_id = parse_optional_uuid(row.get("actor_id")?, &context)?;
    let subject_id = parse_optional_uuid(row.get("subject_id")?, &context)?;
    let lifecycle = lifecycle_from_row(row, &context)?;

    let description: String = row.get("description")?;
    if description.is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty description in {context}"
        )));
    }

    Ok(HistoryRecord {
        uuid,
        description,
        actor_id,
        subject: SubjectRef {
            kind: row.get("subject_kind")?,
            id: subject_id,
        },
        lifecycle,
    })
}
