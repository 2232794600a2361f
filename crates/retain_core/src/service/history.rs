//! Change-history recorder.
//!
//! # Responsibility
//! - Turn a watched-field diff into one immutable history record.
//! - Attribute the change to the acting user or to an anonymous actor.
//!
//! # Invariants
//! - An empty diff creates no record: change detection, not blind logging,
//!   gates record creation. This is the sole deliberate silent no-op.
//! - Recording is caller-invoked; it is not triggered by every save.
//! - The entity's shadow snapshot refreshes only after a record persists.

use crate::model::actor::ActorContext;
use crate::model::history::HistoryRecord;
use crate::model::lifecycle::SoftDeletable;
use crate::model::subject::SubjectRef;
use crate::model::tracker::Tracked;
use crate::repo::history_repo::HistoryRepository;
use crate::repo::RepoResult;
use log::{debug, info};

/// Recorder service over a history repository.
pub struct HistoryRecorder<R: HistoryRepository> {
    repo: R,
}

impl<R: HistoryRepository> HistoryRecorder<R> {
    /// Creates a recorder using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Records the entity's pending watched-field changes, if any.
    ///
    /// Returns `Ok(None)` when nothing changed (no record is created).
    /// Otherwise persists exactly one record whose description is the actor
    /// prefix plus one clause per changed field, and refreshes the entity's
    /// shadow snapshot.
    ///
    /// An absent or unauthenticated `actor` is recorded as anonymous.
    pub fn record_change<T: SoftDeletable + Tracked>(
        &self,
        entity: &mut T,
        actor: Option<&ActorContext>,
    ) -> RepoResult<Option<HistoryRecord>> {
        let changes = entity.pending_changes();
        if changes.is_empty() {
            debug!(
                "event=history_record module=history status=skip kind={} id={} reason=no_changes",
                entity.kind(),
                entity.id()
            );
            return Ok(None);
        }

        let (actor_id, mut description) = match actor.and_then(ActorContext::authenticated_user) {
            Some((user_id, label)) => (Some(user_id), format!("User {label} changed: ")),
            None => (None, "Anonymous user changed: ".to_string()),
        };
        description.push_str(&changes);

        let record = HistoryRecord::new(
            description,
            actor_id,
            SubjectRef::to_entity(&entity.entity_ref()),
        );
        self.repo.create(&record)?;
        entity.begin_tracking();

        info!(
            "event=history_record module=history status=ok kind={} id={} record={}",
            entity.kind(),
            entity.id(),
            record.uuid
        );
        Ok(Some(record))
    }
}
