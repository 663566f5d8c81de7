mod error;
pub mod models;
pub mod seed;

use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

pub use error::StoreError;

use models::*;

/// Generate an opaque, globally unique identifier with a readable prefix.
pub(crate) fn random_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

/// The full relational state of the system. All engine operations work on
/// one of these behind a [`MemoryStore`] lock.
#[derive(Debug, Default)]
pub struct StoreState {
    pub users: Vec<User>,
    pub courses: Vec<Course>,
    pub participants: Vec<Participant>,
    pub assignments: Vec<InstructorAssignment>,
    pub phases: Vec<Phase>,
    pub annexes: Vec<Annex>,
    pub signatures: Vec<Signature>,
    pub attendance: Vec<AttendanceRecord>,
    pub audit_logs: Vec<AuditLogEntry>,
}

impl StoreState {
    pub fn user(&self, user_id: &str) -> Result<&User, StoreError> {
        self.users
            .iter()
            .find(|entry| entry.id == user_id)
            .ok_or(StoreError::NotFound("user"))
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        let needle = email.trim().to_lowercase();
        self.users
            .iter()
            .find(|entry| entry.email.to_lowercase() == needle)
    }

    pub fn course(&self, course_id: &str) -> Result<&Course, StoreError> {
        self.courses
            .iter()
            .find(|entry| entry.id == course_id)
            .ok_or(StoreError::NotFound("course"))
    }

    pub fn participant(&self, participant_id: &str) -> Result<&Participant, StoreError> {
        self.participants
            .iter()
            .find(|entry| entry.id == participant_id)
            .ok_or(StoreError::NotFound("participant"))
    }

    pub fn participant_mut(&mut self, participant_id: &str) -> Result<&mut Participant, StoreError> {
        self.participants
            .iter_mut()
            .find(|entry| entry.id == participant_id)
            .ok_or(StoreError::NotFound("participant"))
    }

    pub fn participant_by_user(&self, user_id: &str) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|entry| entry.user_id.as_deref() == Some(user_id))
    }

    pub fn phase_by_type(
        &self,
        participant_id: &str,
        phase_type: PhaseType,
    ) -> Result<&Phase, StoreError> {
        self.phases
            .iter()
            .find(|entry| entry.participant_id == participant_id && entry.phase_type == phase_type)
            .ok_or(StoreError::NotFound("phase"))
    }

    pub fn phase_by_type_mut(
        &mut self,
        participant_id: &str,
        phase_type: PhaseType,
    ) -> Result<&mut Phase, StoreError> {
        self.phases
            .iter_mut()
            .find(|entry| entry.participant_id == participant_id && entry.phase_type == phase_type)
            .ok_or(StoreError::NotFound("phase"))
    }

    /// Phase rows for a participant in progression order.
    pub fn phases_in_order(&self, participant_id: &str) -> Result<Vec<&Phase>, StoreError> {
        PHASE_ORDER
            .iter()
            .map(|phase_type| self.phase_by_type(participant_id, *phase_type))
            .collect()
    }

    /// Derived phase cursor: the first non-completed phase in order, or
    /// `completion` once every phase is completed.
    pub fn current_phase_type(&self, participant_id: &str) -> Result<PhaseType, StoreError> {
        for phase in self.phases_in_order(participant_id)? {
            if phase.status != PhaseStatus::Completed {
                return Ok(phase.phase_type);
            }
        }
        Ok(PhaseType::Completion)
    }

    pub fn annex(&self, annex_id: &str) -> Result<&Annex, StoreError> {
        self.annexes
            .iter()
            .find(|entry| entry.id == annex_id)
            .ok_or(StoreError::NotFound("annex"))
    }

    pub fn annex_mut(&mut self, annex_id: &str) -> Result<&mut Annex, StoreError> {
        self.annexes
            .iter_mut()
            .find(|entry| entry.id == annex_id)
            .ok_or(StoreError::NotFound("annex"))
    }

    pub fn annex_by_type(&self, participant_id: &str, annex_type: AnnexType) -> Option<&Annex> {
        self.annexes
            .iter()
            .find(|entry| entry.participant_id == participant_id && entry.annex_type == annex_type)
    }

    /// Signatures on an annex, ascending by signing time.
    pub fn signatures_for_annex(&self, annex_id: &str) -> Vec<&Signature> {
        let mut signatures: Vec<&Signature> = self
            .signatures
            .iter()
            .filter(|entry| entry.annex_id == annex_id)
            .collect();
        signatures.sort_by_key(|entry| entry.signed_at);
        signatures
    }

    pub fn is_annex_fully_signed(&self, annex: &Annex) -> bool {
        let signed_roles: HashSet<Role> = self
            .signatures_for_annex(&annex.id)
            .iter()
            .map(|entry| entry.actor_role)
            .collect();
        annex
            .annex_type
            .required_signers()
            .iter()
            .all(|role| signed_roles.contains(role))
    }

    pub fn participant_ids_for_instructor(&self, instructor_id: &str) -> HashSet<String> {
        self.assignments
            .iter()
            .filter(|assignment| assignment.instructor_id == instructor_id)
            .map(|assignment| assignment.participant_id.clone())
            .collect()
    }

    /// One-line attendance summary used on annex 3 documents.
    pub fn attendance_summary(&self, participant_id: &str) -> String {
        let records: Vec<&AttendanceRecord> = self
            .attendance
            .iter()
            .filter(|entry| entry.participant_id == participant_id)
            .collect();

        if records.is_empty() {
            return "Sin sesiones registradas".to_string();
        }

        let total_hours: f64 = records.iter().map(|record| record.hours).sum();
        format!("{} sesiones - {:.1} horas", records.len(), total_hours)
    }

    /// Most recent instructor note for a participant, by session date.
    pub fn latest_instructor_note(&self, participant_id: &str) -> Option<String> {
        self.attendance
            .iter()
            .filter(|entry| entry.participant_id == participant_id && entry.notes.is_some())
            .max_by_key(|entry| entry.session_date)
            .and_then(|entry| entry.notes.clone())
    }
}

/// In-memory store with a construction-time lifecycle. Mutating operations
/// hold the write lock for their whole span, so every mutation on an entity
/// graph is observed atomically; reads never see a half-applied change.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    /// An empty store. Use [`crate::engine::Engine::with_demo_data`] for
    /// the seeded demo dataset.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().expect("store lock poisoned")
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().expect("store lock poisoned")
    }

    /// Swap in a fully-built state (seeding, test resets).
    pub fn replace(&self, state: StoreState) {
        *self.write() = state;
    }
}
