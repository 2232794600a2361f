//! Postal address generically associated to an arbitrary owner.
//!
//! # Responsibility
//! - Hold one postal address and its generic owner reference.
//! - Declare the watched-field set feeding change history.
//!
//! # Invariants
//! - Every postal field is watched, in declaration order.
//! - The owner pair is ordinary field storage; pairing is not enforced here.

use crate::model::lifecycle::{Lifecycle, SoftDeletable};
use crate::model::subject::SubjectRef;
use crate::model::tracker::{ChangeTracker, FieldValue, Tracked};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Soft-deletable postal address record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub uuid: Uuid,
    pub postal_code: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub complement: Option<String>,
    pub note: Option<String>,
    /// Generic association to the owning entity.
    pub owner: SubjectRef,
    pub lifecycle: Lifecycle,
    #[serde(skip)]
    tracker: ChangeTracker,
}

impl Address {
    /// Type tag used for generic association and registry lookup.
    pub const KIND: &'static str = "address";

    /// Creates an empty address owned by `owner`, with a generated id.
    pub fn new(owner: SubjectRef) -> Self {
        Self::with_id(Uuid::new_v4(), owner)
    }

    /// Creates an empty address with a caller-provided stable id.
    pub fn with_id(uuid: Uuid, owner: SubjectRef) -> Self {
        let mut address = Self {
            uuid,
            owner,
            ..Self::default()
        };
        address.begin_tracking();
        address
    }

    /// Single-line display form of the address.
    ///
    /// Unset components are skipped rather than rendered empty.
    pub fn full_address(&self) -> String {
        let mut full_address = String::new();
        if let Some(street) = &self.street {
            full_address.push_str(street);
        }
        if let Some(number) = &self.number {
            full_address.push_str(&format!(", {number}"));
        }
        if let Some(district) = &self.district {
            full_address.push_str(&format!(", {district}"));
        }
        if let Some(city) = &self.city {
            full_address.push_str(&format!(", {city}"));
        }
        if let Some(region) = &self.region {
            full_address.push_str(&format!(" - {region}"));
        }
        if let Some(complement) = &self.complement {
            full_address.push_str(&format!(" ({complement})"));
        }
        full_address
    }
}

impl SoftDeletable for Address {
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

impl Tracked for Address {
    fn watched_fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("postal_code", FieldValue::from(self.postal_code.clone())),
            ("street", FieldValue::from(self.street.clone())),
            ("number", FieldValue::from(self.number.clone())),
            ("district", FieldValue::from(self.district.clone())),
            ("city", FieldValue::from(self.city.clone())),
            ("region", FieldValue::from(self.region.clone())),
            ("complement", FieldValue::from(self.complement.clone())),
            ("note", FieldValue::from(self.note.clone())),
        ]
    }

    fn change_tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    fn change_tracker_mut(&mut self) -> &mut ChangeTracker {
        &mut self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::Address;
    use crate::model::subject::SubjectRef;
    use crate::model::tracker::Tracked;

    #[test]
    fn full_address_skips_unset_components() {
        let mut address = Address::new(SubjectRef::absent());
        address.street = Some("Main Street".to_string());
        address.number = Some("42".to_string());
        address.city = Some("Springfield".to_string());
        address.region = Some("IL".to_string());

        assert_eq!(address.full_address(), "Main Street, 42, Springfield - IL");
    }

    #[test]
    fn full_address_appends_complement_in_parentheses() {
        let mut address = Address::new(SubjectRef::absent());
        address.street = Some("Main Street".to_string());
        address.complement = Some("back entrance".to_string());

        assert_eq!(address.full_address(), "Main Street (back entrance)");
    }

    #[test]
    fn fresh_address_reports_no_pending_changes() {
        let address = Address::new(SubjectRef::absent());
        assert_eq!(address.pending_changes(), "");
    }

    #[test]
    fn edited_postal_field_shows_up_in_pending_changes() {
        let mut address = Address::new(SubjectRef::absent());
        address.city = Some("Springfield".to_string());
        assert_eq!(address.pending_changes(), "city None -> Springfield");
    }
}
