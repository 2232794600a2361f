//! User account referenced as acting user by history records.
//!
//! # Responsibility
//! - Hold the identifying fields of one account.
//!
//! # Invariants
//! - Carries no credentials; authentication is outside this layer.
//! - `username` is unique among all rows, deleted ones included.

use crate::model::lifecycle::{Lifecycle, SoftDeletable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Soft-deletable user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub uuid: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub lifecycle: Lifecycle,
}

impl UserAccount {
    /// Type tag used for generic association and registry lookup.
    pub const KIND: &'static str = "user";

    /// Creates an account with a generated stable id.
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), username)
    }

    /// Creates an account with a caller-provided stable id.
    pub fn with_id(uuid: Uuid, username: impl Into<String>) -> Self {
        Self {
            uuid,
            username: username.into(),
            email: None,
            display_name: None,
            lifecycle: Lifecycle::default(),
        }
    }

    /// Human-readable label used in history messages and resolution.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

impl SoftDeletable for UserAccount {
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
