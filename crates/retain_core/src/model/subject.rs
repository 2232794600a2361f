//! Generic `(type tag, id)` association between records.
//!
//! # Responsibility
//! - Let history and address rows reference an entity of any registered type
//!   without a dedicated foreign key per owner type.
//!
//! # Invariants
//! - `EntityRef` is always concrete: both the tag and the id are present.
//! - `SubjectRef` mirrors the nullable stored pair; pairing is the caller's
//!   responsibility and is not enforced at the storage layer.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Concrete reference to one record of a registered entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// Stable type tag of the target entity type.
    pub kind: String,
    /// Primary key of the target record.
    pub id: Uuid,
}

impl EntityRef {
    pub fn new(kind: impl Into<String>, id: Uuid) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Stored generic association: both halves nullable.
///
/// A row may carry no association at all; a half-set pair is treated as
/// absent by `to_entity_ref()` rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRef {
    pub kind: Option<String>,
    pub id: Option<Uuid>,
}

impl SubjectRef {
    /// An absent association.
    pub fn absent() -> Self {
        Self::default()
    }

    /// Builds the stored pair pointing at one concrete record.
    pub fn to_entity(reference: &EntityRef) -> Self {
        Self {
            kind: Some(reference.kind.clone()),
            id: Some(reference.id),
        }
    }

    /// Returns the concrete reference when both halves are present.
    ///
    /// Callers must null-check this before dereferencing; a half-set pair
    /// resolves to `None`.
    pub fn to_entity_ref(&self) -> Option<EntityRef> {
        match (&self.kind, self.id) {
            (Some(kind), Some(id)) => Some(EntityRef::new(kind.clone(), id)),
            _ => None,
        }
    }
}
