//! Watched-field change tracking.
//!
//! # Responsibility
//! - Capture a shadow snapshot of an entity's watched fields at
//!   construction/hydration time.
//! - Compute the audit diff message between the snapshot and live values.
//!
//! # Invariants
//! - Diff clauses follow the declaration order of `watched_fields()`.
//! - Foreign keys are compared by raw identifier, never by loaded object.
//! - A field absent from the snapshot always counts as changed.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Captured value of one watched field.
///
/// Values compare structurally; foreign keys are carried as `Id` so two
/// loads of the same row never produce a spurious change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Absent/unset value, rendered with the literal `None` marker.
    Null,
    Text(String),
    Integer(i64),
    Bool(bool),
    /// Raw foreign-key identifier.
    Id(Uuid),
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "None"),
            Self::Text(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Id(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        Self::Id(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Shadow snapshot of watched-field values, keyed by field name.
///
/// Populated at construction/hydration and refreshed only when a
/// save-and-record cycle completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeTracker {
    snapshot: Vec<(&'static str, FieldValue)>,
}

impl ChangeTracker {
    /// Creates a tracker with no captured snapshot.
    ///
    /// Every watched field diffs as changed until `capture` runs.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Captures the provided watched-field values as the new snapshot.
    pub fn capture(fields: Vec<(&'static str, FieldValue)>) -> Self {
        Self { snapshot: fields }
    }

    /// Returns the shadow value captured for one field, if any.
    pub fn shadow(&self, field: &str) -> Option<&FieldValue> {
        self.snapshot
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    /// Computes the audit diff message against the live watched fields.
    ///
    /// One `"{field} {old} -> {new}"` clause per changed field, joined by
    /// single spaces; the empty string when nothing changed. A field with no
    /// shadow value is reported as changed from the `None` marker.
    pub fn diff(&self, current: &[(&'static str, FieldValue)]) -> String {
        let mut clauses = Vec::new();
        for (field, live) in current {
            match self.shadow(field) {
                Some(old) if old == live => {}
                Some(old) => clauses.push(format!("{field} {old} -> {live}")),
                // Unset shadow: report the change rather than suppress it.
                None => clauses.push(format!("{field} {} -> {live}", FieldValue::Null)),
            }
        }
        clauses.join(" ")
    }
}

/// Contract for entities declaring watched fields for change tracking.
pub trait Tracked {
    /// Watched field names and live values, in declaration order.
    ///
    /// For foreign keys report the raw identifier (`FieldValue::Id`), not the
    /// referenced record.
    fn watched_fields(&self) -> Vec<(&'static str, FieldValue)> {
        Vec::new()
    }

    fn change_tracker(&self) -> &ChangeTracker;

    fn change_tracker_mut(&mut self) -> &mut ChangeTracker;

    /// Re-captures the shadow snapshot from the current field values.
    ///
    /// Called at construction/hydration and after a completed
    /// save-and-record cycle.
    fn begin_tracking(&mut self) {
        let snapshot = self.watched_fields();
        *self.change_tracker_mut() = ChangeTracker::capture(snapshot);
    }

    /// Computes the diff message between the snapshot and current values.
    fn pending_changes(&self) -> String {
        self.change_tracker().diff(&self.watched_fields())
    }
}
