//! Core soft-delete and audit-history layer for relational records.
//! This crate is the single source of truth for lifecycle invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::actor::ActorContext;
pub use model::address::Address;
pub use model::history::HistoryRecord;
pub use model::lifecycle::{now_epoch_ms, Lifecycle, SoftDeletable};
pub use model::subject::{EntityRef, SubjectRef};
pub use model::tracker::{ChangeTracker, FieldValue, Tracked};
pub use model::user::UserAccount;
pub use repo::address_repo::{AddressListQuery, AddressRepository, SqliteAddressRepository};
pub use repo::history_repo::{HistoryRepository, SqliteHistoryRepository};
pub use repo::scope::{RestoreFilter, Scope};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::history::HistoryRecorder;
pub use service::registry::{
    EntityRegistry, KindEntry, LifecycleHook, RegistryError, RelatedFn, ResolveFn,
    ResolvedSubject,
};
pub use service::soft_delete::{EngineError, EngineResult, SoftDeleteEngine};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
