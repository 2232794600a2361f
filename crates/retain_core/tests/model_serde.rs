use retain_core::{
    Address, EntityRef, HistoryRecord, Lifecycle, SoftDeletable, SubjectRef, Tracked, UserAccount,
};
use uuid::Uuid;

#[test]
fn address_new_sets_defaults() {
    let address = Address::new(SubjectRef::absent());

    assert!(!address.uuid.is_nil());
    assert_eq!(address.postal_code, None);
    assert_eq!(address.owner.to_entity_ref(), None);
    assert!(address.lifecycle.is_active());
    assert_eq!(address.pending_changes(), "");
}

#[test]
fn history_record_serialization_uses_expected_wire_fields() {
    let subject_id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let actor_id = Uuid::parse_str("99999999-8888-4777-8666-555555555555").unwrap();
    let record = HistoryRecord::new(
        "User jdoe changed: city None -> Springfield",
        Some(actor_id),
        SubjectRef::to_entity(&EntityRef::new(Address::KIND, subject_id)),
    );

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["uuid"], record.uuid.to_string());
    assert_eq!(
        json["description"],
        "User jdoe changed: city None -> Springfield"
    );
    assert_eq!(json["actor_id"], actor_id.to_string());
    assert_eq!(json["subject"]["kind"], "address");
    assert_eq!(json["subject"]["id"], subject_id.to_string());
    assert_eq!(json["lifecycle"]["is_deleted"], false);

    let decoded: HistoryRecord = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn address_serialization_skips_the_shadow_snapshot() {
    let mut address = Address::new(SubjectRef::absent());
    address.city = Some("Springfield".to_string());

    let json = serde_json::to_value(&address).unwrap();
    assert_eq!(json["city"], "Springfield");
    assert!(json.get("tracker").is_none());

    // The snapshot is rebuilt at hydration, so a decoded address starts
    // clean even when the source instance had pending changes.
    let mut decoded: Address = serde_json::from_value(json).unwrap();
    decoded.begin_tracking();
    assert_eq!(decoded.pending_changes(), "");
}

#[test]
fn entity_refs_round_trip_through_json() {
    let reference = EntityRef::new(UserAccount::KIND, Uuid::new_v4());
    let json = serde_json::to_value(&reference).unwrap();
    let decoded: EntityRef = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, reference);
}

#[test]
fn envelope_default_matches_a_fresh_record() {
    let account = UserAccount::new("jdoe");
    assert_eq!(account.lifecycle, Lifecycle::default());
    assert_eq!(account.entity_ref().kind, "user");
    assert_eq!(account.entity_ref().id, account.uuid);
}
