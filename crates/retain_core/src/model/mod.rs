//! Domain model for soft-deletable records and their audit trail.
//!
//! # Responsibility
//! - Define the lifecycle envelope shared by every soft-deletable entity.
//! - Define change tracking, generic association and audit-record shapes.
//!
//! # Invariants
//! - Deletion is represented by soft-delete tombstones, not hard delete.
//! - `is_deleted` is true exactly when `deleted_at` is set.
//! - History records are immutable once created.

pub mod actor;
pub mod address;
pub mod history;
pub mod lifecycle;
pub mod subject;
pub mod tracker;
pub mod user;
