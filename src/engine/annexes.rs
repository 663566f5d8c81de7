//! Annex issuance and retrieval. Generation is an upsert: at most one
//! annex exists per (participant, annex type), and regeneration re-renders
//! the same record in place, keeping its identity and signatures.

use serde::Serialize;
use serde_json::json;
use time::OffsetDateTime;
use tracing::info;

use crate::config;
use crate::document::render::{
    render_annex, AnnexDocumentInput, CourseBlock, ParticipantBlock, SignatureLine,
};
use crate::error::{EngineError, EngineResult};
use crate::store::models::{
    Annex, AnnexStatus, AnnexType, AuthenticatedActor, Participant, PhaseStatus, PhaseType, Role,
    TEMPLATE_VERSION,
};
use crate::store::{random_id, StoreState};

use super::policy::assert_participant_access;
use super::{append_audit, format_date, now, Engine};

#[derive(Debug, Clone, Serialize)]
pub struct AnnexSummary {
    pub id: String,
    pub participant_id: String,
    pub phase_id: String,
    pub phase_type: PhaseType,
    pub annex_type: AnnexType,
    pub title: &'static str,
    pub status: AnnexStatus,
    pub template_version: String,
    pub generated_at: OffsetDateTime,
    pub file_name: String,
    pub content_hash: String,
}

#[derive(Debug, Clone)]
pub struct AnnexDownload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_hash: String,
}

pub(crate) fn annex_summary(annex: &Annex) -> AnnexSummary {
    AnnexSummary {
        id: annex.id.clone(),
        participant_id: annex.participant_id.clone(),
        phase_id: annex.phase_id.clone(),
        phase_type: annex.annex_type.phase_type(),
        annex_type: annex.annex_type,
        title: annex.annex_type.title(),
        status: annex.status,
        template_version: annex.template_version.clone(),
        generated_at: annex.generated_at,
        file_name: annex.file_name.clone(),
        content_hash: annex.content_hash.clone(),
    }
}

/// Fold the Latin diacritics that occur in Spanish names, so file names
/// stay plain ASCII.
fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'Á' | 'À' | 'Ä' | 'Â' => 'A',
        'É' | 'È' | 'Ë' | 'Ê' => 'E',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
        'Ñ' => 'N',
        'Ç' => 'C',
        other => other,
    }
}

/// Normalize a display name into a file-name-safe slug: fold accents,
/// drop punctuation, hyphenate whitespace runs, collapse and trim hyphens.
pub(crate) fn normalize_name(value: &str) -> String {
    let folded: String = value
        .chars()
        .map(fold_accent)
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut slug = String::with_capacity(folded.len());
    for part in folded.split(|c: char| c.is_whitespace() || c == '-') {
        if part.is_empty() {
            continue;
        }
        if !slug.is_empty() {
            slug.push('-');
        }
        slug.push_str(part);
    }
    slug
}

/// Deterministic download name: annex title plus the normalized
/// participant name.
pub(crate) fn annex_file_name(annex_type: AnnexType, participant: &Participant) -> String {
    format!(
        "{}-{}.pdf",
        annex_type.title().replace(' ', "-"),
        normalize_name(&format!(
            "{}-{}",
            participant.first_name, participant.last_name
        ))
    )
}

/// Display lines for the signatures already on an annex, ascending by
/// signing time, falling back to the signer's registry name.
pub(crate) fn signature_lines(
    state: &StoreState,
    annex_id: &str,
) -> EngineResult<Vec<SignatureLine>> {
    state
        .signatures_for_annex(annex_id)
        .into_iter()
        .map(|entry| {
            let name = match &entry.signer_name {
                Some(name) => name.clone(),
                None => state.user(&entry.signer_user_id)?.name.clone(),
            };
            Ok(SignatureLine {
                role: entry.actor_role,
                name,
                signed_at: format_date(entry.signed_at),
            })
        })
        .collect()
}

/// Assemble the renderer input for an annex of the given type and emission
/// time. Pure reads only; all lookups fail before any caller mutates.
pub(crate) fn build_document_input(
    state: &StoreState,
    participant: &Participant,
    annex_type: AnnexType,
    generated_at: OffsetDateTime,
    signatures: Vec<SignatureLine>,
) -> EngineResult<AnnexDocumentInput> {
    let course = state.course(&participant.course_id)?;

    Ok(AnnexDocumentInput {
        annex_type,
        participant: ParticipantBlock {
            full_name: participant.full_name(),
            id_number: participant.id_number.clone(),
            email: participant.email.clone(),
            phone: participant.phone.clone(),
        },
        course: CourseBlock {
            name: course.name.clone(),
            duration_hours: course.duration_hours,
            start_date: course.start_date.to_string(),
            end_date: course.end_date.to_string(),
        },
        phase_label: annex_type.phase_type().label().to_string(),
        generated_at: format_date(generated_at),
        attendance_summary: Some(state.attendance_summary(&participant.id)),
        instructor_notes: state.latest_instructor_note(&participant.id),
        signatures,
    })
}

/// Create the annex on first generation or refresh an existing one, and
/// re-render its document. Rendering happens before any mutation so a
/// failure leaves the state untouched. Returns the annex id.
pub(crate) fn generate_or_refresh_annex(
    state: &mut StoreState,
    participant_id: &str,
    annex_type: AnnexType,
    at: OffsetDateTime,
) -> EngineResult<String> {
    let phase_id = state
        .phase_by_type(participant_id, annex_type.phase_type())?
        .id
        .clone();
    let participant = state.participant(participant_id)?.clone();

    let existing_id = state
        .annex_by_type(participant_id, annex_type)
        .map(|annex| annex.id.clone());

    let signatures = match &existing_id {
        Some(annex_id) => signature_lines(state, annex_id)?,
        None => Vec::new(),
    };

    let input = build_document_input(state, &participant, annex_type, at, signatures)?;
    let rendered = render_annex(&input);

    let annex_id = match existing_id {
        Some(annex_id) => {
            let annex = state.annex_mut(&annex_id)?;
            annex.generated_at = at;
            annex.updated_at = at;
            annex.pdf_bytes = rendered.bytes;
            annex.content_hash = rendered.content_hash;
            annex_id
        }
        None => {
            let annex_id = random_id("annex");
            state.annexes.push(Annex {
                id: annex_id.clone(),
                participant_id: participant_id.to_string(),
                phase_id,
                annex_type,
                status: AnnexStatus::Generated,
                template_version: TEMPLATE_VERSION.to_string(),
                file_name: annex_file_name(annex_type, &participant),
                storage_path: format!(
                    "{}/{}/{}.pdf",
                    config::get().storage.annex_dir,
                    participant_id,
                    annex_type
                ),
                content_hash: rendered.content_hash,
                generated_at: at,
                updated_at: at,
                pdf_bytes: rendered.bytes,
            });
            annex_id
        }
    };

    // Issuing a document for a dormant phase starts it.
    let phase = state.phase_by_type_mut(participant_id, annex_type.phase_type())?;
    if phase.status == PhaseStatus::NotStarted {
        phase.status = PhaseStatus::InProgress;
        phase.started_at = Some(at);
        phase.updated_at = at;
    }

    Ok(annex_id)
}

impl Engine {
    /// Generate (or regenerate) an annex for the participant. Defaults to
    /// the annex type of the active phase; generating for another phase
    /// requires the override flag.
    pub fn generate_annex(
        &self,
        actor: &AuthenticatedActor,
        participant_id: &str,
        annex_type: Option<AnnexType>,
        override_flag: bool,
    ) -> EngineResult<AnnexSummary> {
        let mut state = self.store().write();
        assert_participant_access(&state, actor, participant_id)?;

        if !matches!(actor.role, Role::Administrator | Role::Instructor) {
            return Err(EngineError::AccessDenied(
                "only administrators and instructors can generate annexes".to_string(),
            ));
        }

        let current_phase = state.current_phase_type(participant_id)?;
        let annex_type = annex_type.unwrap_or_else(|| current_phase.annex_type());

        if !override_flag && annex_type.phase_type() != current_phase {
            return Err(EngineError::RuleViolation(
                "cannot generate annexes outside the active phase".to_string(),
            ));
        }

        let annex_id = generate_or_refresh_annex(&mut state, participant_id, annex_type, now())?;

        append_audit(
            &mut state,
            &actor.user_id,
            "annex_generated",
            "annex",
            Some(&annex_id),
            Some(json!({ "annex_type": annex_type, "override": override_flag })),
        );
        info!(%annex_id, participant_id, %annex_type, "annex generated");

        Ok(annex_summary(state.annex(&annex_id)?))
    }

    /// Annexes of a participant, ascending by generation time.
    pub fn list_annexes(
        &self,
        actor: &AuthenticatedActor,
        participant_id: &str,
    ) -> EngineResult<Vec<AnnexSummary>> {
        let state = self.store().read();
        assert_participant_access(&state, actor, participant_id)?;

        let mut annexes: Vec<&Annex> = state
            .annexes
            .iter()
            .filter(|annex| annex.participant_id == participant_id)
            .collect();
        annexes.sort_by_key(|annex| annex.generated_at);

        Ok(annexes.into_iter().map(annex_summary).collect())
    }

    pub fn get_annex(
        &self,
        actor: &AuthenticatedActor,
        annex_id: &str,
    ) -> EngineResult<AnnexSummary> {
        let state = self.store().read();
        let annex = state.annex(annex_id)?;
        assert_participant_access(&state, actor, &annex.participant_id)?;

        Ok(annex_summary(annex))
    }

    pub fn download_annex(
        &self,
        actor: &AuthenticatedActor,
        annex_id: &str,
    ) -> EngineResult<AnnexDownload> {
        let state = self.store().read();
        let annex = state.annex(annex_id)?;
        assert_participant_access(&state, actor, &annex.participant_id)?;

        Ok(AnnexDownload {
            file_name: annex.file_name.clone(),
            bytes: annex.pdf_bytes.clone(),
            content_hash: annex.content_hash.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_names_for_file_names() {
        assert_eq!(normalize_name("Miguel-Sanchez Vega"), "Miguel-Sanchez-Vega");
        assert_eq!(normalize_name("José  Núñez"), "Jose-Nunez");
        assert_eq!(normalize_name("--O'Brien--"), "OBrien");
        assert_eq!(normalize_name("  "), "");
    }
}
