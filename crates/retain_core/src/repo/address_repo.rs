//! Address repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide scoped CRUD over `addresses`, owner-filtered listing included.
//! - Stamp lifecycle timestamps on every persist.
//!
//! # Invariants
//! - `created_at` is set on first persist (or kept when preset) and never
//!   overwritten after; `updated_at` is re-stamped on every persist.
//! - Hydrated rows capture their watched-field snapshot before being
//!   returned.

use crate::model::address::Address;
use crate::model::subject::{EntityRef, SubjectRef};
use crate::model::tracker::Tracked;
use crate::repo::scope::{restore_deleted_rows, RestoreFilter, Scope};
use crate::repo::{
    bool_to_int, ensure_connection_ready, lifecycle_from_row, parse_optional_uuid, parse_uuid,
    RepoError, RepoResult, NOW_MS_SQL,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const ADDRESS_SELECT_SQL: &str = "SELECT
    uuid,
    postal_code,
    street,
    number,
    district,
    city,
    region,
    complement,
    note,
    owner_kind,
    owner_id,
    created_at,
    updated_at,
    is_deleted,
    deleted_at
FROM addresses";

const ADDRESS_COLUMNS: &[&str] = &[
    "uuid",
    "postal_code",
    "street",
    "number",
    "district",
    "city",
    "region",
    "complement",
    "note",
    "owner_kind",
    "owner_id",
    "created_at",
    "updated_at",
    "is_deleted",
    "deleted_at",
];

/// Query options for listing addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressListQuery {
    /// View to read from; defaults to the active view.
    pub scope: Scope,
    /// Restrict to addresses attached to this owner.
    pub owner: Option<EntityRef>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for address CRUD operations.
pub trait AddressRepository {
    /// Persists one new address and returns its stable id.
    fn create(&self, address: &Address) -> RepoResult<Uuid>;
    /// Persists all fields of an existing address.
    fn update(&self, address: &Address) -> RepoResult<()>;
    /// Gets one address by id within the given view.
    fn get(&self, id: Uuid, scope: Scope) -> RepoResult<Option<Address>>;
    /// Lists addresses using scope/owner filters and pagination.
    fn list(&self, query: &AddressListQuery) -> RepoResult<Vec<Address>>;
    /// Bulk-restores matching deleted rows; no cascade, no history.
    fn restore_deleted_matching(&self, filter: &RestoreFilter) -> RepoResult<usize>;
}

/// SQLite-backed address repository.
pub struct SqliteAddressRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAddressRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "addresses", ADDRESS_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl AddressRepository for SqliteAddressRepository<'_> {
    fn create(&self, address: &Address) -> RepoResult<Uuid> {
        self.conn.execute(
            &format!(
                "INSERT INTO addresses (
                    uuid,
                    postal_code,
                    street,
                    number,
                    district,
                    city,
                    region,
                    complement,
                    note,
                    owner_kind,
                    owner_id,
                    created_at,
                    updated_at,
                    is_deleted,
                    deleted_at
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
                    COALESCE(?12, {NOW_MS_SQL}), {NOW_MS_SQL}, ?13, ?14
                );"
            ),
            params![
                address.uuid.to_string(),
                address.postal_code.as_deref(),
                address.street.as_deref(),
                address.number.as_deref(),
                address.district.as_deref(),
                address.city.as_deref(),
                address.region.as_deref(),
                address.complement.as_deref(),
                address.note.as_deref(),
                address.owner.kind.as_deref(),
                address.owner.id.map(|id| id.to_string()),
                address.lifecycle.created_at,
                bool_to_int(address.lifecycle.is_deleted),
                address.lifecycle.deleted_at,
            ],
        )?;

        Ok(address.uuid)
    }

    fn update(&self, address: &Address) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE addresses
                 SET
                    postal_code = ?1,
                    street = ?2,
                    number = ?3,
                    district = ?4,
                    city = ?5,
                    region = ?6,
                    complement = ?7,
                    note = ?8,
                    owner_kind = ?9,
                    owner_id = ?10,
                    created_at = COALESCE(created_at, {NOW_MS_SQL}),
                    updated_at = {NOW_MS_SQL},
                    is_deleted = ?11,
                    deleted_at = ?12
                 WHERE uuid = ?13;"
            ),
            params![
                address.postal_code.as_deref(),
                address.street.as_deref(),
                address.number.as_deref(),
                address.district.as_deref(),
                address.city.as_deref(),
                address.region.as_deref(),
                address.complement.as_deref(),
                address.note.as_deref(),
                address.owner.kind.as_deref(),
                address.owner.id.map(|id| id.to_string()),
                bool_to_int(address.lifecycle.is_deleted),
                address.lifecycle.deleted_at,
                address.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(address.uuid));
        }

        Ok(())
    }

    fn get(&self, id: Uuid, scope: Scope) -> RepoResult<Option<Address>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ADDRESS_SELECT_SQL}
             WHERE uuid = ?1{};",
            scope.sql_clause()
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_address_row(row)?));
        }

        Ok(None)
    }

    fn list(&self, query: &AddressListQuery) -> RepoResult<Vec<Address>> {
        let mut sql = format!(
            "{ADDRESS_SELECT_SQL} WHERE 1 = 1{}",
            query.scope.sql_clause()
        );
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(owner) = &query.owner {
            sql.push_str(" AND owner_kind = ? AND owner_id = ?");
            bind_values.push(Value::Text(owner.kind.clone()));
            bind_values.push(Value::Text(owner.id.to_string()));
        }

        sql.push_str(" ORDER BY updated_at DESC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut addresses = Vec::new();
        while let Some(row) = rows.next()? {
            addresses.push(parse_address_row(row)?);
        }

        Ok(addresses)
    }

    fn restore_deleted_matching(&self, filter: &RestoreFilter) -> RepoResult<usize> {
        restore_deleted_rows(self.conn, "addresses", filter)
    }
}

fn parse_address_row(row: &Row<'_>) -> RepoResult<Address> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "addresses.uuid")?;
    let context = format!("addresses.uuid={uuid_text}");

    let owner_id = parse_optional_uuid(row.get("owner_id")?, &context)?;
    let lifecycle = lifecycle_from_row(row, &context)?;

    let mut address = Address::with_id(
        uuid,
        SubjectRef {
            kind: row.get("owner_kind")?,
            id: owner_id,
        },
    );
    address.postal_code = row.get("postal_code")?;
    address.street = row.get("street")?;
    address.number = row.get("number")?;
    address.district = row.get("district")?;
    address.city = row.get("city")?;
    address.region = row.get("region")?;
    address.complement = row.get("complement")?;
    address.note = row.get("note")?;
    address.lifecycle = lifecycle;
    // Snapshot is captured from the hydrated values, not the empty shell.
    address.begin_tracking();
    Ok(address)
}
