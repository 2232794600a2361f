//! Entity-kind registry for generic association and cascade.
//!
//! # Responsibility
//! - Map each type tag to its table, related-objects source, lifecycle hooks
//!   and subject resolver.
//! - Resolve stored `(type tag, id)` pairs back to a concrete subject.
//!
//! # Invariants
//! - Type tags and table names are validated identifiers; duplicates are
//!   rejected at registration.
//! - Resolution of an unknown tag or a missing row returns `Ok(None)`,
//!   never an error.

use crate::model::address::Address;
use crate::model::history::HistoryRecord;
use crate::model::subject::{EntityRef, SubjectRef};
use crate::model::user::UserAccount;
use crate::repo::address_repo::{AddressRepository, SqliteAddressRepository};
use crate::repo::history_repo::{HistoryRepository, SqliteHistoryRepository};
use crate::repo::scope::Scope;
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::RepoResult;
use rusqlite::{Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Source of the directly related records one entity cascades to.
pub type RelatedFn = Box<dyn Fn(&Connection, Uuid) -> RepoResult<Vec<EntityRef>> + Send + Sync>;

/// Extension hook run after a delete/restore transition persists.
pub type LifecycleHook = Box<dyn Fn(&Connection, Uuid) -> RepoResult<()> + Send + Sync>;

/// Kind-specific resolver from id to subject summary.
pub type ResolveFn =
    Box<dyn Fn(&Connection, Uuid) -> RepoResult<Option<ResolvedSubject>> + Send + Sync>;

/// Concrete subject a stored association resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSubject {
    pub reference: EntityRef,
    /// Human-readable label of the target record.
    pub label: String,
    pub is_deleted: bool,
}

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidKind(String),
    InvalidTable { kind: String, table: String },
    DuplicateKind(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKind(kind) => write!(f, "entity kind tag is invalid: {kind}"),
            Self::InvalidTable { kind, table } => {
                write!(f, "entity kind `{kind}` has invalid table name: {table}")
            }
            Self::DuplicateKind(kind) => write!(f, "entity kind already registered: {kind}"),
        }
    }
}

impl Error for RegistryError {}

/// One registered entity kind.
///
/// The table must carry the lifecycle envelope columns; the engine updates
/// them directly by table name.
pub struct KindEntry {
    kind: String,
    table: String,
    related: Option<RelatedFn>,
    after_delete: Option<LifecycleHook>,
    after_restore: Option<LifecycleHook>,
    resolve: Option<ResolveFn>,
}

impl KindEntry {
    pub fn new(kind: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            table: table.into(),
            related: None,
            after_delete: None,
            after_restore: None,
            resolve: None,
        }
    }

    /// Declares where this kind's related objects come from.
    pub fn with_related(mut self, related: RelatedFn) -> Self {
        self.related = Some(related);
        self
    }

    pub fn with_after_delete(mut self, hook: LifecycleHook) -> Self {
        self.after_delete = Some(hook);
        self
    }

    pub fn with_after_restore(mut self, hook: LifecycleHook) -> Self {
        self.after_restore = Some(hook);
        self
    }

    /// Overrides the default row-existence resolver.
    pub fn with_resolver(mut self, resolve: ResolveFn) -> Self {
        self.resolve = Some(resolve);
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub(crate) fn table(&self) -> &str {
        &self.table
    }

    /// Flat list of directly related records; empty when none declared.
    pub(crate) fn related_refs(&self, conn: &Connection, id: Uuid) -> RepoResult<Vec<EntityRef>> {
        match &self.related {
            Some(related) => related(conn, id),
            None => Ok(Vec::new()),
        }
    }

    pub(crate) fn run_after_delete(&self, conn: &Connection, id: Uuid) -> RepoResult<()> {
        match &self.after_delete {
            Some(hook) => hook(conn, id),
            None => Ok(()),
        }
    }

    pub(crate) fn run_after_restore(&self, conn: &Connection, id: Uuid) -> RepoResult<()> {
        match &self.after_restore {
            Some(hook) => hook(conn, id),
            None => Ok(()),
        }
    }

    fn resolve(&self, conn: &Connection, id: Uuid) -> RepoResult<Option<ResolvedSubject>> {
        if let Some(resolve) = &self.resolve {
            return resolve(conn, id);
        }

        // Default resolver: row existence plus tombstone state.
        let row: Option<i64> = conn
            .query_row(
                &format!("SELECT is_deleted FROM {} WHERE uuid = ?1;", self.table),
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        Ok(row.map(|is_deleted| ResolvedSubject {
            reference: EntityRef::new(self.kind.clone(), id),
            label: format!("{} {id}", self.kind),
            is_deleted: is_deleted != 0,
        }))
    }
}

/// Lookup table from type tag to registered entity kind.
#[derive(Default)]
pub struct EntityRegistry {
    entries: BTreeMap<String, KindEntry>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry preloaded with the crate's built-in kinds.
    pub fn with_builtin_kinds() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(builtin_user_kind())?;
        registry.register(builtin_history_kind())?;
        registry.register(builtin_address_kind())?;
        Ok(registry)
    }

    /// Registers one entity kind.
    pub fn register(&mut self, entry: KindEntry) -> Result<(), RegistryError> {
        if !is_valid_identifier(&entry.kind) {
            return Err(RegistryError::InvalidKind(entry.kind));
        }
        if !is_valid_identifier(&entry.table) {
            return Err(RegistryError::InvalidTable {
                kind: entry.kind,
                table: entry.table,
            });
        }
        if self.entries.contains_key(&entry.kind) {
            return Err(RegistryError::DuplicateKind(entry.kind));
        }

        self.entries.insert(entry.kind.clone(), entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    /// Returns sorted registered type tags.
    pub fn kinds(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub(crate) fn get(&self, kind: &str) -> Option<&KindEntry> {
        self.entries.get(kind)
    }

    /// Resolves a concrete reference to its subject summary.
    ///
    /// Unknown tags and missing rows resolve to `Ok(None)`; callers must
    /// null-check before dereferencing.
    pub fn resolve(
        &self,
        conn: &Connection,
        reference: &EntityRef,
    ) -> RepoResult<Option<ResolvedSubject>> {
        match self.entries.get(&reference.kind) {
            Some(entry) => entry.resolve(conn, reference.id),
            None => Ok(None),
        }
    }

    /// Resolves a stored nullable pair; absent or half-set pairs resolve to
    /// `Ok(None)`.
    pub fn resolve_subject(
        &self,
        conn: &Connection,
        subject: &SubjectRef,
    ) -> RepoResult<Option<ResolvedSubject>> {
        match subject.to_entity_ref() {
            Some(reference) => self.resolve(conn, &reference),
            None => Ok(None),
        }
    }
}

fn builtin_user_kind() -> KindEntry {
    KindEntry::new(UserAccount::KIND, "users").with_resolver(Box::new(|conn: &Connection, id: Uuid| {
        let repo = SqliteUserRepository::try_new(conn)?;
        Ok(repo.get(id, Scope::Global)?.map(|account| ResolvedSubject {
            reference: EntityRef::new(UserAccount::KIND, id),
            label: account.label().to_string(),
            is_deleted: account.lifecycle.is_deleted,
        }))
    }))
}

fn builtin_history_kind() -> KindEntry {
    KindEntry::new(HistoryRecord::KIND, "history_records").with_resolver(Box::new(|conn: &Connection, id: Uuid| {
        let repo = SqliteHistoryRepository::try_new(conn)?;
        Ok(repo.get(id, Scope::Global)?.map(|record| ResolvedSubject {
            reference: EntityRef::new(HistoryRecord::KIND, id),
            label: record.description.clone(),
            is_deleted: record.lifecycle.is_deleted,
        }))
    }))
}

fn builtin_address_kind() -> KindEntry {
    KindEntry::new(Address::KIND, "addresses").with_resolver(Box::new(|conn: &Connection, id: Uuid| {
        let repo = SqliteAddressRepository::try_new(conn)?;
        Ok(repo.get(id, Scope::Global)?.map(|address| ResolvedSubject {
            reference: EntityRef::new(Address::KIND, id),
            label: address.full_address(),
            is_deleted: address.lifecycle.is_deleted,
        }))
    }))
}

fn is_valid_identifier(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
