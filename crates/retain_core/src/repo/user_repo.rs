//! User-account repository: account lookups plus soft-delete views.
//!
//! # Responsibility
//! - Provide account persistence and username lookup.
//! - Provide the same scoped views and bulk restore as every other
//!   soft-deletable table.
//!
//! # Invariants
//! - Both behaviors live on one type by explicit composition; scope SQL is
//!   delegated to `repo::scope`, never duplicated through inheritance-like
//!   layering.
//! - `find_by_username` reads the active view only.

use crate::model::user::UserAccount;
use crate::repo::scope::{restore_deleted_rows, RestoreFilter, Scope};
use crate::repo::{
    bool_to_int, ensure_connection_ready, lifecycle_from_row, parse_uuid, RepoError, RepoResult,
    NOW_MS_SQL,
};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    uuid,
    username,
    email,
    display_name,
    created_at,
    updated_at,
    is_deleted,
    deleted_at
FROM users";

const USER_COLUMNS: &[&str] = &[
    "uuid",
    "username",
    "email",
    "display_name",
    "created_at",
    "updated_at",
    "is_deleted",
    "deleted_at",
];

/// Repository interface combining account operations and soft-delete views.
pub trait UserRepository {
    /// Persists one new account and returns its stable id.
    ///
    /// A duplicate username surfaces as the underlying constraint error.
    fn create(&self, account: &UserAccount) -> RepoResult<Uuid>;
    /// Persists all fields of an existing account.
    fn update(&self, account: &UserAccount) -> RepoResult<()>;
    /// Gets one account by id within the given view.
    fn get(&self, id: Uuid, scope: Scope) -> RepoResult<Option<UserAccount>>;
    /// Finds an active account by exact username.
    fn find_by_username(&self, username: &str) -> RepoResult<Option<UserAccount>>;
    /// Lists accounts within the given view.
    fn list(&self, scope: Scope) -> RepoResult<Vec<UserAccount>>;
    /// Bulk-restores matching deleted rows; no cascade, no history.
    fn restore_deleted_matching(&self, filter: &RestoreFilter) -> RepoResult<usize>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "users", USER_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create(&self, account: &UserAccount) -> RepoResult<Uuid> {
        self.conn.execute(
            &format!(
                "INSERT INTO users (
                    uuid,
                    username,
                    email,
                    display_name,
                    created_at,
                    updated_at,
                    is_deleted,
                    deleted_at
                ) VALUES (?1, ?2, ?3, ?4, COALESCE(?5, {NOW_MS_SQL}), {NOW_MS_SQL}, ?6, ?7);"
            ),
            params![
                account.uuid.to_string(),
                account.username.as_str(),
                account.email.as_deref(),
                account.display_name.as_deref(),
                account.lifecycle.created_at,
                bool_to_int(account.lifecycle.is_deleted),
                account.lifecycle.deleted_at,
            ],
        )?;

        Ok(account.uuid)
    }

    fn update(&self, account: &UserAccount) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE users
                 SET
                    username = ?1,
                    email = ?2,
                    display_name = ?3,
                    created_at = COALESCE(created_at, {NOW_MS_SQL}),
                    updated_at = {NOW_MS_SQL},
                    is_deleted = ?4,
                    deleted_at = ?5
                 WHERE uuid = ?6;"
            ),
            params![
                account.username.as_str(),
                account.email.as_deref(),
                account.display_name.as_deref(),
                bool_to_int(account.lifecycle.is_deleted),
                account.lifecycle.deleted_at,
                account.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(account.uuid));
        }

        Ok(())
    }

    fn get(&self, id: Uuid, scope: Scope) -> RepoResult<Option<UserAccount>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}
             WHERE uuid = ?1{};",
            scope.sql_clause()
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<UserAccount>> {
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}
             WHERE username = ?1{};",
            Scope::Active.sql_clause()
        ))?;

        let mut rows = stmt.query([username])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn list(&self, scope: Scope) -> RepoResult<Vec<UserAccount>> {
        let sql = format!(
            "{USER_SELECT_SQL}
             WHERE 1 = 1{}
             ORDER BY username ASC;",
            scope.sql_clause()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut accounts = Vec::new();
        while let Some(row) = rows.next()? {
            accounts.push(parse_user_row(row)?);
        }
        Ok(accounts)
    }

    fn restore_deleted_matching(&self, filter: &RestoreFilter) -> RepoResult<usize> {
        restore_deleted_rows(self.conn, "users", filter)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<UserAccount> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "users.uuid")?;
    let context = format!("users.uuid={uuid_text}");

    let username: String = row.get("username")?;
    if username.is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty username in {context}"
        )));
    }

    Ok(UserAccount {
        uuid,
        username,
        email: row.get("email")?,
        display_name: row.get("display_name")?,
        lifecycle: lifecycle_from_row(row, &context)?,
    })
}
