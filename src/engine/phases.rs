//! Phase progression. The participant's current phase is never stored; it
//! is always the first non-completed phase in order, which rules out a
//! stale cursor by construction.

use serde::Serialize;
use serde_json::json;
use time::OffsetDateTime;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::store::models::{AnnexStatus, AuthenticatedActor, PhaseStatus, PhaseType, Role};
use crate::store::StoreState;

use super::policy::assert_participant_access;
use super::{append_audit, now, Engine};

#[derive(Debug, Clone, Serialize)]
pub struct PhaseView {
    pub id: String,
    pub phase_type: PhaseType,
    pub status: PhaseStatus,
    pub started_at: Option<OffsetDateTime>,
    pub completed_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseProgress {
    pub participant_id: String,
    pub current_phase: PhaseType,
    pub phases: Vec<PhaseView>,
}

pub(crate) fn phase_views(state: &StoreState, participant_id: &str) -> EngineResult<Vec<PhaseView>> {
    Ok(state
        .phases_in_order(participant_id)?
        .into_iter()
        .map(|phase| PhaseView {
            id: phase.id.clone(),
            phase_type: phase.phase_type,
            status: phase.status,
            started_at: phase.started_at,
            completed_at: phase.completed_at,
        })
        .collect())
}

impl Engine {
    /// Phase rows of a participant in progression order.
    pub fn get_participant_phases(
        &self,
        actor: &AuthenticatedActor,
        participant_id: &str,
    ) -> EngineResult<Vec<PhaseView>> {
        let state = self.store().read();
        assert_participant_access(&state, actor, participant_id)?;
        phase_views(&state, participant_id)
    }

    /// Complete the active phase and start the next one. Requires the
    /// active phase's annex to be signed unless an administrator override
    /// is supplied; participants cannot advance themselves.
    pub fn progress_phase(
        &self,
        actor: &AuthenticatedActor,
        participant_id: &str,
        override_flag: bool,
    ) -> EngineResult<PhaseProgress> {
        let mut state = self.store().write();
        assert_participant_access(&state, actor, participant_id)?;

        if actor.role == Role::Participant {
            return Err(EngineError::AccessDenied(
                "participants cannot advance phases themselves".to_string(),
            ));
        }

        let current_type = state.current_phase_type(participant_id)?;
        let active = state.phase_by_type(participant_id, current_type)?;

        if active.status == PhaseStatus::Completed {
            return Err(EngineError::RuleViolation(
                "the current phase is already completed".to_string(),
            ));
        }

        // Signature completeness, not mere existence, gates progression.
        let annex_type = current_type.annex_type();
        let annex_signed = state
            .annex_by_type(participant_id, annex_type)
            .map(|annex| annex.status == AnnexStatus::Signed)
            .unwrap_or(false);

        if !override_flag && !annex_signed {
            return Err(EngineError::RuleViolation(
                "cannot progress without a signed annex unless an administrator override is supplied"
                    .to_string(),
            ));
        }

        let at = now();
        let next_type = current_type.next();

        let active = state.phase_by_type_mut(participant_id, current_type)?;
        active.status = PhaseStatus::Completed;
        active.completed_at = Some(at);
        active.updated_at = at;
        let active_id = active.id.clone();

        if let Some(next_type) = next_type {
            let next_phase = state.phase_by_type_mut(participant_id, next_type)?;
            if next_phase.status == PhaseStatus::NotStarted {
                next_phase.status = PhaseStatus::InProgress;
                next_phase.started_at = Some(at);
                next_phase.updated_at = at;
            }
        }

        state.participant_mut(participant_id)?.updated_at = at;

        append_audit(
            &mut state,
            &actor.user_id,
            "phase_progressed",
            "phase",
            Some(&active_id),
            Some(json!({
                "override": override_flag,
                "from": current_type,
                "to": next_type,
            })),
        );
        info!(
            participant_id,
            from = %current_type,
            to = next_type.map(|t| t.as_str()).unwrap_or("none"),
            override_flag,
            "phase progressed"
        );

        Ok(PhaseProgress {
            participant_id: participant_id.to_string(),
            current_phase: state.current_phase_type(participant_id)?,
            phases: phase_views(&state, participant_id)?,
        })
    }
}
