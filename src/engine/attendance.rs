//! Attendance tracking: append-only session records used by the annex 3
//! document and the dashboards.

use serde::Serialize;
use serde_json::json;
use time::{Date, OffsetDateTime};
use tracing::info;
use validator::Validate;

use crate::error::{EngineError, EngineResult};
use crate::store::models::{AttendanceRecord, AuthenticatedActor, NewAttendance, Role};
use crate::store::{random_id, StoreState};

use super::policy::assert_participant_access;
use super::{append_audit, now, Engine};

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceView {
    pub id: String,
    pub participant_id: String,
    pub instructor_id: String,
    pub instructor_name: String,
    pub session_date: Date,
    pub hours: f64,
    pub notes: Option<String>,
    pub created_at: OffsetDateTime,
}

pub(crate) fn attendance_view(
    state: &StoreState,
    record: &AttendanceRecord,
) -> EngineResult<AttendanceView> {
    Ok(AttendanceView {
        id: record.id.clone(),
        participant_id: record.participant_id.clone(),
        instructor_id: record.instructor_id.clone(),
        instructor_name: state.user(&record.instructor_id)?.name.clone(),
        session_date: record.session_date,
        hours: record.hours,
        notes: record.notes.clone(),
        created_at: record.created_at,
    })
}

impl Engine {
    /// Record a training session for a participant.
    pub fn mark_attendance(
        &self,
        actor: &AuthenticatedActor,
        participant_id: &str,
        input: NewAttendance,
    ) -> EngineResult<AttendanceView> {
        input.validate()?;

        let mut state = self.store().write();
        assert_participant_access(&state, actor, participant_id)?;

        if !matches!(actor.role, Role::Administrator | Role::Instructor) {
            return Err(EngineError::AccessDenied(
                "only administrators and instructors can record attendance".to_string(),
            ));
        }

        state.participant(participant_id)?;

        let at = now();
        let record = AttendanceRecord {
            id: random_id("attendance"),
            participant_id: participant_id.to_string(),
            instructor_id: actor.user_id.clone(),
            session_date: input.session_date,
            hours: (input.hours * 10.0).round() / 10.0,
            notes: input.notes,
            created_at: at,
        };
        let record_id = record.id.clone();
        let hours = record.hours;
        state.attendance.push(record);

        append_audit(
            &mut state,
            &actor.user_id,
            "attendance_marked",
            "attendance",
            Some(&record_id),
            Some(json!({ "participant_id": participant_id, "hours": hours })),
        );
        info!(%record_id, participant_id, hours, "attendance marked");

        state.participant_mut(participant_id)?.updated_at = at;

        let record = state
            .attendance
            .iter()
            .find(|entry| entry.id == record_id)
            .ok_or_else(|| EngineError::Internal("attendance vanished after insert".to_string()))?;
        attendance_view(&state, record)
    }

    /// Attendance records for a participant, ascending by session date.
    pub fn list_attendance(
        &self,
        actor: &AuthenticatedActor,
        participant_id: &str,
    ) -> EngineResult<Vec<AttendanceView>> {
        let state = self.store().read();
        assert_participant_access(&state, actor, participant_id)?;

        let mut records: Vec<&AttendanceRecord> = state
            .attendance
            .iter()
            .filter(|entry| entry.participant_id == participant_id)
            .collect();
        records.sort_by_key(|entry| entry.session_date);

        records
            .into_iter()
            .map(|record| attendance_view(&state, record))
            .collect()
    }
}
