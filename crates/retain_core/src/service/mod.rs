//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the soft-delete state machine and
//!   the change-history recorder.
//! - Keep callers decoupled from per-table SQL details via the entity-kind
//!   registry.

pub mod history;
pub mod registry;
pub mod soft_delete;
