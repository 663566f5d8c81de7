//! Participant management and the composite participant view returned by
//! listing and dashboard operations.

use serde::Serialize;
use serde_json::json;
use time::OffsetDateTime;
use tracing::info;
use validator::Validate;

use crate::error::{EngineError, EngineResult};
use crate::store::models::{
    AuthenticatedActor, NewParticipant, Participant, Phase, PhaseStatus, PhaseType, Role,
    UpdateParticipant, User, PHASE_ORDER,
};
use crate::store::{random_id, StoreState};

use super::annexes::{annex_summary, AnnexSummary};
use super::attendance::{attendance_view, AttendanceView};
use super::phases::{phase_views, PhaseView};
use super::policy::{assert_participant_access, can_access_participant};
use super::{append_audit, now, Engine};

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantView {
    pub id: String,
    pub user_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub id_number: String,
    pub email: String,
    pub phone: String,
    pub course_id: String,
    pub course_name: String,
    pub current_phase: PhaseType,
    pub phases: Vec<PhaseView>,
    pub annexes: Vec<AnnexSummary>,
    pub attendance: Vec<AttendanceView>,
    pub assigned_instructor_ids: Vec<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub can_edit: bool,
}

pub(crate) fn build_participant_view(
    state: &StoreState,
    participant: &Participant,
    actor: Option<&AuthenticatedActor>,
) -> EngineResult<ParticipantView> {
    let annexes = state
        .annexes
        .iter()
        .filter(|annex| annex.participant_id == participant.id)
        .map(annex_summary)
        .collect();

    let attendance = state
        .attendance
        .iter()
        .filter(|entry| entry.participant_id == participant.id)
        .map(|entry| attendance_view(state, entry))
        .collect::<EngineResult<Vec<_>>>()?;

    let assigned_instructor_ids = state
        .assignments
        .iter()
        .filter(|assignment| assignment.participant_id == participant.id)
        .map(|assignment| assignment.instructor_id.clone())
        .collect();

    Ok(ParticipantView {
        id: participant.id.clone(),
        user_id: participant.user_id.clone(),
        first_name: participant.first_name.clone(),
        last_name: participant.last_name.clone(),
        full_name: participant.full_name(),
        id_number: participant.id_number.clone(),
        email: participant.email.clone(),
        phone: participant.phone.clone(),
        course_id: participant.course_id.clone(),
        course_name: state.course(&participant.course_id)?.name.clone(),
        current_phase: state.current_phase_type(&participant.id)?,
        phases: phase_views(state, &participant.id)?,
        annexes,
        attendance,
        assigned_instructor_ids,
        created_at: participant.created_at,
        updated_at: participant.updated_at,
        can_edit: actor.map(|a| a.role == Role::Administrator).unwrap_or(false),
    })
}

impl Engine {
    /// Participants visible to the actor under the access policy.
    pub fn list_participants(
        &self,
        actor: &AuthenticatedActor,
    ) -> EngineResult<Vec<ParticipantView>> {
        let state = self.store().read();

        state
            .participants
            .iter()
            .filter(|participant| match actor.role {
                Role::Administrator => true,
                _ => can_access_participant(&state, actor, &participant.id),
            })
            .map(|participant| build_participant_view(&state, participant, Some(actor)))
            .collect()
    }

    pub fn get_participant(
        &self,
        actor: &AuthenticatedActor,
        participant_id: &str,
    ) -> EngineResult<ParticipantView> {
        let state = self.store().read();
        assert_participant_access(&state, actor, participant_id)?;
        build_participant_view(&state, state.participant(participant_id)?, Some(actor))
    }

    /// Register a participant in a course, together with their three phase
    /// rows (diagnostic starts immediately) and, by default, a login user.
    pub fn create_participant(
        &self,
        actor: &AuthenticatedActor,
        input: NewParticipant,
    ) -> EngineResult<ParticipantView> {
        input.validate()?;

        let mut state = self.store().write();

        if actor.role != Role::Administrator {
            return Err(EngineError::AccessDenied(
                "only administrators can create participants".to_string(),
            ));
        }

        state.course(&input.course_id)?;

        if state
            .participants
            .iter()
            .any(|entry| entry.email.eq_ignore_ascii_case(&input.email))
        {
            return Err(EngineError::Conflict(
                "a participant with this email is already registered".to_string(),
            ));
        }

        let at = now();
        let participant_id = random_id("participant");

        let user_id = if input.create_login.unwrap_or(true) {
            let existing = state.user_by_email(&input.email).map(|user| user.id.clone());
            match existing {
                Some(user_id) => Some(user_id),
                None => {
                    let user = User {
                        id: random_id("user"),
                        email: input.email.clone(),
                        name: format!("{} {}", input.first_name, input.last_name),
                        role: Role::Participant,
                        created_at: at,
                    };
                    let user_id = user.id.clone();
                    state.users.push(user);
                    Some(user_id)
                }
            }
        } else {
            None
        };

        state.participants.push(Participant {
            id: participant_id.clone(),
            user_id,
            course_id: input.course_id.clone(),
            first_name: input.first_name,
            last_name: input.last_name,
            id_number: input.id_number,
            email: input.email,
            phone: input.phone,
            created_at: at,
            updated_at: at,
        });

        for phase_type in PHASE_ORDER {
            let starts_now = phase_type == PhaseType::Diagnostic;
            state.phases.push(Phase {
                id: random_id("phase"),
                participant_id: participant_id.clone(),
                phase_type,
                status: if starts_now {
                    PhaseStatus::InProgress
                } else {
                    PhaseStatus::NotStarted
                },
                started_at: starts_now.then_some(at),
                completed_at: None,
                created_at: at,
                updated_at: at,
            });
        }

        append_audit(
            &mut state,
            &actor.user_id,
            "participant_created",
            "participant",
            Some(&participant_id),
            Some(json!({ "course_id": &input.course_id })),
        );
        info!(%participant_id, course_id = %input.course_id, "participant created");

        build_participant_view(&state, state.participant(&participant_id)?, Some(actor))
    }

    /// Partial update of a participant's profile. Administrators only.
    pub fn update_participant(
        &self,
        actor: &AuthenticatedActor,
        participant_id: &str,
        input: UpdateParticipant,
    ) -> EngineResult<ParticipantView> {
        input.validate()?;

        let mut state = self.store().write();

        if actor.role != Role::Administrator {
            return Err(EngineError::AccessDenied(
                "only administrators can update participants".to_string(),
            ));
        }

        if let Some(course_id) = &input.course_id {
            state.course(course_id)?;
        }

        let mut changed: Vec<&'static str> = Vec::new();
        let at = now();

        let participant = state.participant_mut(participant_id)?;
        if let Some(first_name) = input.first_name {
            participant.first_name = first_name;
            changed.push("first_name");
        }
        if let Some(last_name) = input.last_name {
            participant.last_name = last_name;
            changed.push("last_name");
        }
        if let Some(email) = input.email {
            participant.email = email;
            changed.push("email");
        }
        if let Some(phone) = input.phone {
            participant.phone = phone;
            changed.push("phone");
        }
        if let Some(course_id) = input.course_id {
            participant.course_id = course_id;
            changed.push("course_id");
        }
        participant.updated_at = at;

        append_audit(
            &mut state,
            &actor.user_id,
            "participant_updated",
            "participant",
            Some(participant_id),
            Some(json!({ "fields": &changed })),
        );
        info!(participant_id, ?changed, "participant updated");

        build_participant_view(&state, state.participant(participant_id)?, Some(actor))
    }
}
