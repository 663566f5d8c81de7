//! Signature acceptance. A role signs an annex at most once; once every
//! required role has signed, the annex flips to `signed` and the owning
//! phase completes, starting the next one without an explicit progression
//! call.

use serde::Serialize;
use serde_json::json;
use time::OffsetDateTime;
use tracing::info;
use validator::Validate;

use crate::document::render::SignatureLine;
use crate::error::{EngineError, EngineResult};
use crate::store::models::{
    AnnexStatus, AuthenticatedActor, PhaseStatus, PhaseType, Role, Signature, SignatureInput,
};
use crate::store::{random_id, StoreState};

use super::annexes::{build_document_input, signature_lines};
use super::policy::assert_participant_access;
use super::{append_audit, format_date, now, Engine};

#[derive(Debug, Clone, Serialize)]
pub struct SignatureSummary {
    pub id: String,
    pub annex_id: String,
    pub participant_id: String,
    pub signer_user_id: String,
    pub actor_role: Role,
    pub signer_name: Option<String>,
    pub signed_at: OffsetDateTime,
    pub phase_snapshot: PhaseType,
}

pub(crate) fn signature_summary(signature: &Signature) -> SignatureSummary {
    SignatureSummary {
        id: signature.id.clone(),
        annex_id: signature.annex_id.clone(),
        participant_id: signature.participant_id.clone(),
        signer_user_id: signature.signer_user_id.clone(),
        actor_role: signature.actor_role,
        signer_name: signature.signer_name.clone(),
        signed_at: signature.signed_at,
        phase_snapshot: signature.phase_snapshot,
    }
}

pub(crate) struct SignatureDraft<'a> {
    pub signer_user_id: &'a str,
    pub actor_role: Role,
    pub display_name: Option<String>,
    pub signature_data: Option<String>,
    pub signed_at: OffsetDateTime,
}

/// Append a signature to an annex, re-render the document with the new
/// signer, and recompute annex and phase state. All rule checks and the
/// rendering itself run before the first mutation, so a failure leaves no
/// partial state. Returns the signature id.
pub(crate) fn add_signature_record(
    state: &mut StoreState,
    annex_id: &str,
    draft: SignatureDraft<'_>,
) -> EngineResult<String> {
    let annex = state.annex(annex_id)?;
    let annex_type = annex.annex_type;
    let generated_at = annex.generated_at;
    let participant = state.participant(&annex.participant_id)?.clone();

    let required_roles = annex_type.required_signers();
    if !required_roles.contains(&draft.actor_role) {
        return Err(EngineError::RuleViolation(
            "a signature from this role is not required on this annex".to_string(),
        ));
    }

    if state
        .signatures
        .iter()
        .any(|entry| entry.annex_id == annex_id && entry.actor_role == draft.actor_role)
    {
        return Err(EngineError::Conflict(
            "this role has already signed this annex; signatures are immutable".to_string(),
        ));
    }

    let signer_name = match &draft.display_name {
        Some(name) => name.clone(),
        None => state.user(draft.signer_user_id)?.name.clone(),
    };

    let mut lines = signature_lines(state, annex_id)?;
    lines.push(SignatureLine {
        role: draft.actor_role,
        name: signer_name.clone(),
        signed_at: format_date(draft.signed_at),
    });

    let input = build_document_input(state, &participant, annex_type, generated_at, lines)?;
    let rendered = crate::document::render::render_annex(&input);

    let signed_roles: Vec<Role> = state
        .signatures_for_annex(annex_id)
        .iter()
        .map(|entry| entry.actor_role)
        .chain([draft.actor_role])
        .collect();
    let fully_signed = required_roles
        .iter()
        .all(|role| signed_roles.contains(role));

    // Commit.
    let signature_id = random_id("signature");
    state.signatures.push(Signature {
        id: signature_id.clone(),
        annex_id: annex_id.to_string(),
        participant_id: participant.id.clone(),
        signer_user_id: draft.signer_user_id.to_string(),
        actor_role: draft.actor_role,
        signer_name: Some(signer_name),
        signature_data: draft.signature_data,
        signed_at: draft.signed_at,
        phase_snapshot: annex_type.phase_type(),
    });

    let annex = state.annex_mut(annex_id)?;
    annex.status = if fully_signed {
        AnnexStatus::Signed
    } else {
        AnnexStatus::Generated
    };
    annex.pdf_bytes = rendered.bytes;
    annex.content_hash = rendered.content_hash;
    annex.updated_at = draft.signed_at;

    sync_phase_progress_after_signature(
        state,
        &participant.id,
        annex_type.phase_type(),
        draft.signed_at,
    )?;

    Ok(signature_id)
}

/// Once every annex of a phase is signed, the phase completes and the next
/// one starts if it had not already.
fn sync_phase_progress_after_signature(
    state: &mut StoreState,
    participant_id: &str,
    phase_type: PhaseType,
    at: OffsetDateTime,
) -> EngineResult<()> {
    let annexes_for_phase: Vec<&crate::store::models::Annex> = state
        .annexes
        .iter()
        .filter(|entry| {
            entry.participant_id == participant_id && entry.annex_type.phase_type() == phase_type
        })
        .collect();

    if annexes_for_phase.is_empty()
        || annexes_for_phase
            .iter()
            .any(|entry| entry.status != AnnexStatus::Signed)
    {
        return Ok(());
    }

    let phase = state.phase_by_type_mut(participant_id, phase_type)?;
    phase.status = PhaseStatus::Completed;
    phase.completed_at = Some(at);
    phase.updated_at = at;

    if let Some(next_type) = phase_type.next() {
        let next_phase = state.phase_by_type_mut(participant_id, next_type)?;
        if next_phase.status == PhaseStatus::NotStarted {
            next_phase.status = PhaseStatus::InProgress;
            next_phase.started_at = Some(at);
            next_phase.updated_at = at;
        }
    }

    state.participant_mut(participant_id)?.updated_at = at;

    Ok(())
}

impl Engine {
    /// Record a signature on an annex from the acting role.
    pub fn add_signature(
        &self,
        actor: &AuthenticatedActor,
        annex_id: &str,
        input: SignatureInput,
    ) -> EngineResult<SignatureSummary> {
        input.validate()?;

        let mut state = self.store().write();
        let participant_id = state.annex(annex_id)?.participant_id.clone();
        assert_participant_access(&state, actor, &participant_id)?;

        // Beyond plain access, a participant may only sign documents they
        // own.
        if actor.role == Role::Participant {
            let participant = state.participant(&participant_id)?;
            if participant.user_id.as_deref() != Some(actor.user_id.as_str()) {
                return Err(EngineError::AccessDenied(
                    "participants can only sign their own documents".to_string(),
                ));
            }
        }

        let signature_id = add_signature_record(
            &mut state,
            annex_id,
            SignatureDraft {
                signer_user_id: &actor.user_id,
                actor_role: actor.role,
                display_name: input.display_name.clone().or_else(|| Some(actor.name.clone())),
                signature_data: input.signature_data,
                signed_at: now(),
            },
        )?;

        append_audit(
            &mut state,
            &actor.user_id,
            "annex_signed",
            "signature",
            Some(&signature_id),
            Some(json!({ "annex_id": annex_id })),
        );
        info!(%signature_id, annex_id, role = %actor.role, "annex signed");

        let signature = state
            .signatures
            .iter()
            .find(|entry| entry.id == signature_id)
            .ok_or_else(|| EngineError::Internal("signature vanished after insert".to_string()))?;
        Ok(signature_summary(signature))
    }

    /// Signatures on an annex, ascending by signing time.
    pub fn list_signatures(
        &self,
        actor: &AuthenticatedActor,
        annex_id: &str,
    ) -> EngineResult<Vec<SignatureSummary>> {
        let state = self.store().read();
        let annex = state.annex(annex_id)?;
        assert_participant_access(&state, actor, &annex.participant_id)?;

        Ok(state
            .signatures_for_annex(annex_id)
            .into_iter()
            .map(signature_summary)
            .collect())
    }
}
