//! Access policy: pure predicates answering whether an actor may act on a
//! participant. Every engine operation that targets a participant (or an
//! annex through its owner) consults this before reading or mutating.

use crate::error::{EngineError, EngineResult};
use crate::store::models::{AuthenticatedActor, Role};
use crate::store::StoreState;

/// Administrators see everything; instructors see their assigned
/// participants; participants see only themselves.
pub fn can_access_participant(
    state: &StoreState,
    actor: &AuthenticatedActor,
    participant_id: &str,
) -> bool {
    match actor.role {
        Role::Administrator => true,
        Role::Instructor => state
            .participant_ids_for_instructor(&actor.user_id)
            .contains(participant_id),
        Role::Participant => state
            .participant(participant_id)
            .map(|participant| participant.user_id.as_deref() == Some(actor.user_id.as_str()))
            .unwrap_or(false),
    }
}

pub(crate) fn assert_participant_access(
    state: &StoreState,
    actor: &AuthenticatedActor,
    participant_id: &str,
) -> EngineResult<()> {
    if !can_access_participant(state, actor, participant_id) {
        return Err(EngineError::AccessDenied(
            "no access to this participant".to_string(),
        ));
    }
    Ok(())
}
