//! Acting-user context supplied by the caller.
//!
//! # Responsibility
//! - Identify the optional acting user for history messages.
//!
//! # Invariants
//! - An absent context or an unauthenticated actor is treated as anonymous.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller-supplied request/actor context.
///
/// Carries no authentication logic; the caller decides what counts as
/// authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub user_id: Option<Uuid>,
    /// Human-readable identifier used in history messages.
    pub display_name: Option<String>,
    pub authenticated: bool,
}

impl ActorContext {
    /// An anonymous context.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated context for one known user.
    pub fn user(user_id: Uuid, display_name: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            display_name: Some(display_name.into()),
            authenticated: true,
        }
    }

    /// Returns the acting user's id and label when authenticated.
    ///
    /// The label falls back to the id when no display name was supplied.
    pub fn authenticated_user(&self) -> Option<(Uuid, String)> {
        if !self.authenticated {
            return None;
        }
        let user_id = self.user_id?;
        let label = self
            .display_name
            .clone()
            .unwrap_or_else(|| user_id.to_string());
        Some((user_id, label))
    }
}
