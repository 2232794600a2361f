//! Soft-delete/restore engine.
//!
//! # Responsibility
//! - Drive the {active, deleted} state machine over registered entity kinds.
//! - Cascade delete/restore depth-first through declared related objects.
//! - Provide the irreversible, non-cascading hard delete.
//!
//! # Invariants
//! - `delete` stamps `deleted_at` and `updated_at` with one shared timestamp
//!   for the whole cascade; `restore` clears `deleted_at`.
//! - Cascade is sequential and depth-first; there is no cycle detection, the
//!   caller keeps the related-object graph acyclic.
//! - A failure mid-cascade aborts that branch; already-processed siblings
//!   stay transitioned (at-least-once, non-atomic cascade).
//! - Hard delete bypasses hooks, cascade and history entirely.

use crate::model::lifecycle::{now_epoch_ms, SoftDeletable};
use crate::model::subject::EntityRef;
use crate::repo::RepoError;
use crate::service::registry::{EntityRegistry, KindEntry};
use log::info;
use rusqlite::{params, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors from soft-delete engine operations.
#[derive(Debug)]
pub enum EngineError {
    /// Target type tag is not registered.
    UnknownKind(String),
    /// Target row does not exist.
    NotFound(EntityRef),
    /// Persistence-layer failure, propagated unmodified.
    Repo(RepoError),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownKind(kind) => write!(f, "entity kind not registered: {kind}"),
            Self::NotFound(reference) => write!(f, "entity not found: {reference}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EngineError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Delete,
    Restore,
}

impl Transition {
    fn name(self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Restore => "restore",
        }
    }
}

/// State machine driving soft delete/restore over registered kinds.
pub struct SoftDeleteEngine<'a> {
    conn: &'a Connection,
    registry: &'a EntityRegistry,
}

impl<'a> SoftDeleteEngine<'a> {
    pub fn new(conn: &'a Connection, registry: &'a EntityRegistry) -> Self {
        Self { conn, registry }
    }

    /// Soft-deletes the target, then its related objects when `cascade`.
    ///
    /// Idempotent in outcome: an already-deleted target is re-stamped and
    /// re-cascaded.
    pub fn delete(&self, target: &EntityRef, cascade: bool) -> EngineResult<()> {
        self.apply(target, cascade, Transition::Delete, now_epoch_ms())
    }

    /// Restores the target, then its related objects when `cascade`.
    pub fn restore(&self, target: &EntityRef, cascade: bool) -> EngineResult<()> {
        self.apply(target, cascade, Transition::Restore, now_epoch_ms())
    }

    /// Soft-deletes an entity instance, keeping its in-memory envelope in
    /// sync with the persisted row.
    pub fn delete_entity<T: SoftDeletable>(
        &self,
        entity: &mut T,
        cascade: bool,
    ) -> EngineResult<()> {
        let at = now_epoch_ms();
        self.apply(&entity.entity_ref(), cascade, Transition::Delete, at)?;
        entity.lifecycle_mut().mark_deleted(at);
        Ok(())
    }

    /// Restores an entity instance, keeping its in-memory envelope in sync
    /// with the persisted row.
    pub fn restore_entity<T: SoftDeletable>(
        &self,
        entity: &mut T,
        cascade: bool,
    ) -> EngineResult<()> {
        let at = now_epoch_ms();
        self.apply(&entity.entity_ref(), cascade, Transition::Restore, at)?;
        entity.lifecycle_mut().mark_restored(at);
        Ok(())
    }

    /// Physically removes the target row. Irreversible.
    ///
    /// Bypasses the state machine: no hooks, no cascade, no history. Intended
    /// for data-hygiene operations, not user-facing deletion.
    pub fn hard_delete(&self, target: &EntityRef) -> EngineResult<()> {
        let entry = self.entry_for(target)?;

        let removed = self.conn.execute(
            &format!("DELETE FROM {} WHERE uuid = ?1;", entry.table()),
            [target.id.to_string()],
        )?;
        if removed == 0 {
            return Err(EngineError::NotFound(target.clone()));
        }

        info!(
            "event=hard_delete module=engine status=ok kind={} id={}",
            target.kind, target.id
        );
        Ok(())
    }

    fn apply(
        &self,
        target: &EntityRef,
        cascade: bool,
        transition: Transition,
        at_epoch_ms: i64,
    ) -> EngineResult<()> {
        let entry = self.entry_for(target)?;

        let sql = match transition {
            Transition::Delete => format!(
                "UPDATE {}
                 SET
                    is_deleted = 1,
                    deleted_at = ?2,
                    updated_at = ?2
                 WHERE uuid = ?1;",
                entry.table()
            ),
            Transition::Restore => format!(
                "UPDATE {}
                 SET
                    is_deleted = 0,
                    deleted_at = NULL,
                    updated_at = ?2
                 WHERE uuid = ?1;",
                entry.table()
            ),
        };

        let changed = self
            .conn
            .execute(&sql, params![target.id.to_string(), at_epoch_ms])?;
        if changed == 0 {
            return Err(EngineError::NotFound(target.clone()));
        }

        match transition {
            Transition::Delete => entry.run_after_delete(self.conn, target.id)?,
            Transition::Restore => entry.run_after_restore(self.conn, target.id)?,
        }

        info!(
            "event=soft_delete_transition module=engine status=ok op={} kind={} id={} cascade={}",
            transition.name(),
            target.kind,
            target.id,
            cascade
        );

        if cascade {
            for related in entry.related_refs(self.conn, target.id)? {
                self.apply(&related, cascade, transition, at_epoch_ms)?;
            }
        }

        Ok(())
    }

    fn entry_for(&self, target: &EntityRef) -> EngineResult<&KindEntry> {
        self.registry
            .get(&target.kind)
            .ok_or_else(|| EngineError::UnknownKind(target.kind.clone()))
    }
}
