//! Lifecycle envelope shared by every soft-deletable entity.
//!
//! # Responsibility
//! - Hold the audit timestamps and tombstone state for one record.
//! - Provide the `SoftDeletable` contract used by repositories and the
//!   soft-delete engine.
//!
//! # Invariants
//! - `is_deleted == deleted_at.is_some()` for every persisted row.
//! - `created_at` is set once on first persist and never overwritten after.

use crate::model::subject::EntityRef;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Returns the current wall-clock time as epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

/// Audit envelope carried by every soft-deletable record.
///
/// Timestamps are epoch milliseconds. `created_at`/`updated_at` stay `None`
/// until the record is first persisted; repositories stamp them on save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifecycle {
    /// Set once on first persist, never overwritten after.
    pub created_at: Option<i64>,
    /// Re-stamped on every persist.
    pub updated_at: Option<i64>,
    /// Soft-delete tombstone, the source of truth for deletion state.
    pub is_deleted: bool,
    /// Set exactly while `is_deleted` is true.
    pub deleted_at: Option<i64>,
}

impl Lifecycle {
    /// Returns whether this record should be considered visible/active.
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    /// Returns whether the tombstone flag and timestamp agree.
    pub fn is_consistent(&self) -> bool {
        self.is_deleted == self.deleted_at.is_some()
    }

    /// Transitions to the deleted state, stamping both timestamps.
    pub fn mark_deleted(&mut self, at_epoch_ms: i64) {
        self.is_deleted = true;
        self.deleted_at = Some(at_epoch_ms);
        self.updated_at = Some(at_epoch_ms);
    }

    /// Transitions back to the active state, clearing the tombstone.
    pub fn mark_restored(&mut self, at_epoch_ms: i64) {
        self.is_deleted = false;
        self.deleted_at = None;
        self.updated_at = Some(at_epoch_ms);
    }
}

/// Contract for entities carrying the lifecycle envelope.
///
/// `kind()` is the stable type tag used by generic association and the
/// entity-kind registry; it must match the tag the entity was registered
/// under.
pub trait SoftDeletable {
    /// Stable type tag identifying the concrete entity type.
    fn kind(&self) -> &'static str;

    /// Stable primary key of this record.
    fn id(&self) -> Uuid;

    fn lifecycle(&self) -> &Lifecycle;

    fn lifecycle_mut(&mut self) -> &mut Lifecycle;

    /// Concrete `(type tag, id)` reference to this record.
    fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.kind(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::{now_epoch_ms, Lifecycle};

    #[test]
    fn default_envelope_is_active_and_consistent() {
        let lifecycle = Lifecycle::default();
        assert!(lifecycle.is_active());
        assert!(lifecycle.is_consistent());
        assert!(lifecycle.created_at.is_none());
    }

    #[test]
    fn mark_deleted_then_restored_round_trips() {
        let mut lifecycle = Lifecycle::default();

        lifecycle.mark_deleted(1_000);
        assert!(lifecycle.is_deleted);
        assert_eq!(lifecycle.deleted_at, Some(1_000));
        assert_eq!(lifecycle.updated_at, Some(1_000));
        assert!(lifecycle.is_consistent());

        lifecycle.mark_restored(2_000);
        assert!(!lifecycle.is_deleted);
        assert_eq!(lifecycle.deleted_at, None);
        assert_eq!(lifecycle.updated_at, Some(2_000));
        assert!(lifecycle.is_consistent());
    }

    #[test]
    fn mismatched_tombstone_is_reported_inconsistent() {
        let lifecycle = Lifecycle {
            is_deleted: true,
            ..Lifecycle::default()
        };
        assert!(!lifecycle.is_consistent());
    }

    #[test]
    fn now_epoch_ms_is_monotonic_enough_for_stamping() {
        let first = now_epoch_ms();
        let second = now_epoch_ms();
        assert!(second >= first);
        assert!(first > 0);
    }
}
