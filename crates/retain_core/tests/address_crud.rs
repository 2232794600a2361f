use retain_core::db::open_db_in_memory;
use retain_core::{
    Address, AddressListQuery, AddressRepository, EntityRef, EntityRegistry, HistoryRecorder,
    RepoError, RestoreFilter, Scope, SoftDeleteEngine, SqliteAddressRepository,
    SqliteHistoryRepository, SubjectRef, Tracked, UserAccount,
};
use uuid::Uuid;

fn owner_ref() -> EntityRef {
    EntityRef::new(UserAccount::KIND, Uuid::new_v4())
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAddressRepository::try_new(&conn).unwrap();

    let owner = owner_ref();
    let mut address = Address::new(SubjectRef::to_entity(&owner));
    address.postal_code = Some("88047-595".to_string());
    address.street = Some("Main Street".to_string());
    address.city = Some("Springfield".to_string());
    let id = repo.create(&address).unwrap();

    let loaded = repo.get(id, Scope::Active).unwrap().unwrap();
    assert_eq!(loaded.uuid, address.uuid);
    assert_eq!(loaded.postal_code.as_deref(), Some("88047-595"));
    assert_eq!(loaded.owner.to_entity_ref(), Some(owner));
    assert!(!loaded.lifecycle.is_deleted);
    assert!(loaded.lifecycle.created_at.is_some());
}

#[test]
fn hydrated_address_reports_no_pending_changes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAddressRepository::try_new(&conn).unwrap();

    let mut address = Address::new(SubjectRef::absent());
    address.city = Some("Springfield".to_string());
    repo.create(&address).unwrap();

    let loaded = repo.get(address.uuid, Scope::Active).unwrap().unwrap();
    assert_eq!(loaded.pending_changes(), "");
}

#[test]
fn list_filters_by_owner_within_the_active_view() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAddressRepository::try_new(&conn).unwrap();
    let registry = EntityRegistry::with_builtin_kinds().unwrap();
    let engine = SoftDeleteEngine::new(&conn, &registry);

    let owner_a = owner_ref();
    let owner_b = owner_ref();

    let for_a = Address::new(SubjectRef::to_entity(&owner_a));
    let for_b = Address::new(SubjectRef::to_entity(&owner_b));
    let mut deleted_for_a = Address::new(SubjectRef::to_entity(&owner_a));
    repo.create(&for_a).unwrap();
    repo.create(&for_b).unwrap();
    repo.create(&deleted_for_a).unwrap();
    engine.delete_entity(&mut deleted_for_a, true).unwrap();

    let query = AddressListQuery {
        owner: Some(owner_a.clone()),
        ..AddressListQuery::default()
    };
    let owned = repo.list(&query).unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].uuid, for_a.uuid);

    let global_query = AddressListQuery {
        owner: Some(owner_a),
        scope: Scope::Global,
        ..AddressListQuery::default()
    };
    assert_eq!(repo.list(&global_query).unwrap().len(), 2);
}

#[test]
fn list_pagination_is_stable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAddressRepository::try_new(&conn).unwrap();

    for index in 1..=3 {
        let id = Uuid::parse_str(&format!("00000000-0000-4000-8000-00000000000{index}")).unwrap();
        let address = Address::with_id(id, SubjectRef::absent());
        repo.create(&address).unwrap();
    }
    conn.execute("UPDATE addresses SET updated_at = 1234567890000;", [])
        .unwrap();

    let query = AddressListQuery {
        limit: Some(2),
        offset: 1,
        ..AddressListQuery::default()
    };
    let page = repo.list(&query).unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(
        page[0].uuid.to_string(),
        "00000000-0000-4000-8000-000000000002"
    );
    assert_eq!(
        page[1].uuid.to_string(),
        "00000000-0000-4000-8000-000000000003"
    );
}

#[test]
fn update_persists_field_edits() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAddressRepository::try_new(&conn).unwrap();

    let mut address = Address::new(SubjectRef::absent());
    repo.create(&address).unwrap();

    address.street = Some("Main Street".to_string());
    address.number = Some("42".to_string());
    repo.update(&address).unwrap();

    let loaded = repo.get(address.uuid, Scope::Active).unwrap().unwrap();
    assert_eq!(loaded.street.as_deref(), Some("Main Street"));
    assert_eq!(loaded.full_address(), "Main Street, 42");
}

#[test]
fn update_missing_address_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAddressRepository::try_new(&conn).unwrap();

    let address = Address::new(SubjectRef::absent());
    let err = repo.update(&address).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == address.uuid));
}

#[test]
fn postal_field_edits_flow_into_history() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAddressRepository::try_new(&conn).unwrap();
    let recorder = HistoryRecorder::new(SqliteHistoryRepository::try_new(&conn).unwrap());

    let address = Address::new(SubjectRef::absent());
    repo.create(&address).unwrap();

    let mut loaded = repo.get(address.uuid, Scope::Active).unwrap().unwrap();
    loaded.city = Some("Springfield".to_string());
    repo.update(&loaded).unwrap();

    let record = recorder.record_change(&mut loaded, None).unwrap().unwrap();
    assert_eq!(
        record.description,
        "Anonymous user changed: city None -> Springfield"
    );
    assert_eq!(
        record.subject.to_entity_ref(),
        Some(EntityRef::new(Address::KIND, address.uuid))
    );
}

#[test]
fn bulk_restore_matches_only_deleted_addresses() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAddressRepository::try_new(&conn).unwrap();
    let registry = EntityRegistry::with_builtin_kinds().unwrap();
    let engine = SoftDeleteEngine::new(&conn, &registry);

    let mut gone = Address::new(SubjectRef::absent());
    let kept = Address::new(SubjectRef::absent());
    repo.create(&gone).unwrap();
    repo.create(&kept).unwrap();
    engine.delete_entity(&mut gone, true).unwrap();

    let restored = repo
        .restore_deleted_matching(&RestoreFilter::default())
        .unwrap();
    assert_eq!(restored, 1);

    let loaded = repo.get(gone.uuid, Scope::Active).unwrap().unwrap();
    assert!(!loaded.lifecycle.is_deleted);
    assert!(loaded.lifecycle.deleted_at.is_none());
}

#[test]
fn registry_resolves_an_address_owner_pair() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAddressRepository::try_new(&conn).unwrap();
    let registry = EntityRegistry::with_builtin_kinds().unwrap();

    let mut address = Address::new(SubjectRef::absent());
    address.street = Some("Main Street".to_string());
    address.number = Some("42".to_string());
    repo.create(&address).unwrap();

    let resolved = registry
        .resolve(&conn, &EntityRef::new(Address::KIND, address.uuid))
        .unwrap()
        .unwrap();
    assert_eq!(resolved.label, "Main Street, 42");
    assert!(!resolved.is_deleted);

    let missing = registry
        .resolve(&conn, &EntityRef::new(Address::KIND, Uuid::new_v4()))
        .unwrap();
    assert!(missing.is_none());
}
