//! Role dashboards: read-only projections over the same entities, plus
//! course listing.

use serde::Serialize;
use time::Date;

use crate::error::{EngineError, EngineResult};
use crate::store::models::{AnnexStatus, AuthenticatedActor, Course, PhaseType, Role};

use super::participants::{build_participant_view, ParticipantView};
use super::Engine;

#[derive(Debug, Clone, Serialize)]
pub struct AdminTotals {
    pub participants: usize,
    pub annexes_generated: usize,
    pub annexes_signed: usize,
    pub pending_signatures: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseCounts {
    pub diagnostic: usize,
    pub training: usize,
    pub completion: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentAttendance {
    pub id: String,
    pub participant_id: String,
    pub participant_name: String,
    pub session_date: Date,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
    pub totals: AdminTotals,
    pub phases: PhaseCounts,
    pub participants: Vec<ParticipantView>,
    pub recent_attendance: Vec<RecentAttendance>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstructorRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstructorTotals {
    pub participants: usize,
    pub attendance_records: usize,
    pub pending_signatures: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstructorDashboard {
    pub instructor: InstructorRef,
    pub totals: InstructorTotals,
    pub participants: Vec<ParticipantView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantDashboard {
    pub participant: ParticipantView,
    pub pending_annexes: usize,
    pub signed_annexes: usize,
}

impl Engine {
    pub fn list_courses(&self) -> Vec<Course> {
        self.store().read().courses.clone()
    }

    /// Global overview. Administrators only.
    pub fn admin_dashboard(&self, actor: &AuthenticatedActor) -> EngineResult<AdminDashboard> {
        let state = self.store().read();

        if actor.role != Role::Administrator {
            return Err(EngineError::AccessDenied(
                "only administrators can access the global dashboard".to_string(),
            ));
        }

        let participants = state
            .participants
            .iter()
            .map(|participant| build_participant_view(&state, participant, Some(actor)))
            .collect::<EngineResult<Vec<_>>>()?;

        let annexes_generated = state.annexes.len();
        let annexes_signed = state
            .annexes
            .iter()
            .filter(|annex| annex.status == AnnexStatus::Signed)
            .count();

        let mut phases = PhaseCounts {
            diagnostic: 0,
            training: 0,
            completion: 0,
        };
        for participant in &participants {
            match participant.current_phase {
                PhaseType::Diagnostic => phases.diagnostic += 1,
                PhaseType::Training => phases.training += 1,
                PhaseType::Completion => phases.completion += 1,
            }
        }

        let mut recent: Vec<_> = state.attendance.iter().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let recent_attendance = recent
            .into_iter()
            .take(10)
            .map(|entry| {
                Ok(RecentAttendance {
                    id: entry.id.clone(),
                    participant_id: entry.participant_id.clone(),
                    participant_name: state.participant(&entry.participant_id)?.full_name(),
                    session_date: entry.session_date,
                    hours: entry.hours,
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(AdminDashboard {
            totals: AdminTotals {
                participants: participants.len(),
                annexes_generated,
                annexes_signed,
                pending_signatures: annexes_generated - annexes_signed,
            },
            phases,
            participants,
            recent_attendance,
        })
    }

    /// Overview of an instructor's assigned participants.
    pub fn instructor_dashboard(
        &self,
        actor: &AuthenticatedActor,
    ) -> EngineResult<InstructorDashboard> {
        let state = self.store().read();

        if actor.role != Role::Instructor {
            return Err(EngineError::AccessDenied(
                "only instructors can access this dashboard".to_string(),
            ));
        }

        let assigned_ids = state.participant_ids_for_instructor(&actor.user_id);

        let participants = state
            .participants
            .iter()
            .filter(|participant| assigned_ids.contains(&participant.id))
            .map(|participant| build_participant_view(&state, participant, Some(actor)))
            .collect::<EngineResult<Vec<_>>>()?;

        let attendance_records = state
            .attendance
            .iter()
            .filter(|entry| assigned_ids.contains(&entry.participant_id))
            .count();

        let pending_signatures = state
            .annexes
            .iter()
            .filter(|annex| {
                assigned_ids.contains(&annex.participant_id) && annex.status != AnnexStatus::Signed
            })
            .count();

        Ok(InstructorDashboard {
            instructor: InstructorRef {
                id: actor.user_id.clone(),
                name: actor.name.clone(),
            },
            totals: InstructorTotals {
                participants: participants.len(),
                attendance_records,
                pending_signatures,
            },
            participants,
        })
    }

    /// A participant's own progress overview.
    pub fn participant_dashboard(
        &self,
        actor: &AuthenticatedActor,
    ) -> EngineResult<ParticipantDashboard> {
        let state = self.store().read();

        if actor.role != Role::Participant {
            return Err(EngineError::AccessDenied(
                "only participants can access this dashboard".to_string(),
            ));
        }

        let participant = state.participant_by_user(&actor.user_id).ok_or_else(|| {
            EngineError::NotFound("no participant profile exists for this user".to_string())
        })?;

        let profile = build_participant_view(&state, participant, Some(actor))?;
        let signed_annexes = profile
            .annexes
            .iter()
            .filter(|annex| annex.status == AnnexStatus::Signed)
            .count();
        let pending_annexes = profile.annexes.len() - signed_annexes;

        Ok(ParticipantDashboard {
            participant: profile,
            pending_annexes,
            signed_annexes,
        })
    }
}
