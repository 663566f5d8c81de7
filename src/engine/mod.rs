//! The document lifecycle engine: entity ownership, phase progression,
//! annex issuance, signature acceptance and batch export. Every operation
//! takes an already-authenticated actor and enforces the access policy
//! before touching state.

pub mod annexes;
pub mod attendance;
pub mod dashboards;
pub mod export;
pub mod participants;
pub mod phases;
pub mod policy;
pub mod signatures;

use serde_json::Value;
use time::OffsetDateTime;

use crate::error::{EngineError, EngineResult};
use crate::store::models::{AnnexType, AuditLogEntry, AuthenticatedActor, Role};
use crate::store::{random_id, seed, MemoryStore, StoreState};

/// Facade over the in-memory store. Construct with [`Engine::new`] for an
/// empty dataset or [`Engine::with_demo_data`] for the seeded demo.
#[derive(Debug, Default)]
pub struct Engine {
    store: MemoryStore,
}

impl Engine {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    pub fn with_demo_data() -> Self {
        let engine = Engine::new(MemoryStore::new());
        engine.reset_for_tests();
        engine
    }

    /// Restore the seeded demo dataset, discarding all current state.
    pub fn reset_for_tests(&self) {
        let mut state = seed::demo_base_state();
        seed_demo_documents(&mut state).expect("demo dataset must seed cleanly");
        self.store.replace(state);
    }

    pub(crate) fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Raw audit trail, for administrator traceability. Business logic
    /// never reads these entries.
    pub fn list_audit_log(
        &self,
        actor: &AuthenticatedActor,
    ) -> EngineResult<Vec<AuditLogEntry>> {
        let state = self.store.read();
        if actor.role != Role::Administrator {
            return Err(EngineError::AccessDenied(
                "only administrators can read the audit trail".to_string(),
            ));
        }
        Ok(state.audit_logs.clone())
    }
}

/// Annexes and signatures of the demo dataset are produced through the
/// regular document flow so their bytes and fingerprints are real.
fn seed_demo_documents(state: &mut StoreState) -> EngineResult<()> {
    use signatures::SignatureDraft;

    let at = seed::SEED_AT;

    annexes::generate_or_refresh_annex(state, "participant-miguel", AnnexType::Annex2, at)?;

    let laura_annex = annexes::generate_or_refresh_annex(state, "participant-laura", AnnexType::Annex2, at)?;
    signatures::add_signature_record(
        state,
        &laura_annex,
        SignatureDraft {
            signer_user_id: "user-participant-laura",
            actor_role: Role::Participant,
            display_name: Some("Laura Rodriguez Mora".to_string()),
            signature_data: None,
            signed_at: at,
        },
    )?;
    signatures::add_signature_record(
        state,
        &laura_annex,
        SignatureDraft {
            signer_user_id: "user-instructor-carlos",
            actor_role: Role::Instructor,
            display_name: Some("Carlos Martinez Lopez".to_string()),
            signature_data: None,
            signed_at: at,
        },
    )?;

    let sofia_annex_2 = annexes::generate_or_refresh_annex(state, "participant-sofia", AnnexType::Annex2, at)?;
    let sofia_annex_3 = annexes::generate_or_refresh_annex(state, "participant-sofia", AnnexType::Annex3, at)?;
    let sofia_annex_5 = annexes::generate_or_refresh_annex(state, "participant-sofia", AnnexType::Annex5, at)?;

    for (annex_id, signer_user_id, actor_role, display_name) in [
        (&sofia_annex_2, "user-participant-sofia", Role::Participant, "Sofia Lopez Navarro"),
        (&sofia_annex_2, "user-instructor-carlos", Role::Instructor, "Carlos Martinez Lopez"),
        (&sofia_annex_3, "user-instructor-carlos", Role::Instructor, "Carlos Martinez Lopez"),
        (&sofia_annex_5, "user-participant-sofia", Role::Participant, "Sofia Lopez Navarro"),
        (&sofia_annex_5, "user-instructor-carlos", Role::Instructor, "Carlos Martinez Lopez"),
        (&sofia_annex_5, "user-admin-ana", Role::Administrator, "Ana Garcia Ruiz"),
    ] {
        signatures::add_signature_record(
            state,
            annex_id,
            SignatureDraft {
                signer_user_id,
                actor_role,
                display_name: Some(display_name.to_string()),
                signature_data: None,
                signed_at: at,
            },
        )?;
    }

    // Attendance lands last, as in the original fixtures, so the seeded
    // annex documents predate it.
    state.attendance.extend(seed::demo_attendance());

    Ok(())
}

pub(crate) fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Calendar date as it appears on documents and export names (YYYY-MM-DD).
pub(crate) fn format_date(at: OffsetDateTime) -> String {
    at.date().to_string()
}

pub(crate) fn append_audit(
    state: &mut StoreState,
    actor_user_id: &str,
    action: &str,
    resource_type: &str,
    resource_id: Option<&str>,
    context: Option<Value>,
) {
    state.audit_logs.push(AuditLogEntry {
        id: random_id("audit"),
        actor_user_id: Some(actor_user_id.to_string()),
        action: action.to_string(),
        resource_type: resource_type.to_string(),
        resource_id: resource_id.map(|id| id.to_string()),
        context,
        created_at: now(),
    });
}
