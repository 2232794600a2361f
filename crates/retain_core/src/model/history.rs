//! Audit history record.
//!
//! # Responsibility
//! - Describe one recorded change: message, acting user, changed subject.
//!
//! # Invariants
//! - Records are immutable through normal application flow; the management
//!   surface for them is read-only.
//! - `actor_id` null means the change was made anonymously.

use crate::model::lifecycle::{Lifecycle, SoftDeletable};
use crate::model::subject::SubjectRef;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One immutable audit entry, generically associated to the entity that
/// changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub uuid: Uuid,
    /// Actor prefix plus one clause per changed watched field.
    pub description: String,
    /// Acting user, null for anonymous changes.
    pub actor_id: Option<Uuid>,
    /// Generic association to the entity that changed.
    pub subject: SubjectRef,
    pub lifecycle: Lifecycle,
}

impl HistoryRecord {
    /// Type tag used for generic association and registry lookup.
    pub const KIND: &'static str = "history";

    /// Creates a new record with a generated id and a fresh envelope.
    pub fn new(description: impl Into<String>, actor_id: Option<Uuid>, subject: SubjectRef) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            description: description.into(),
            actor_id,
            subject,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl SoftDeletable for HistoryRecord {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn id(&self) -> Uuid {
        self.uuid
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}
