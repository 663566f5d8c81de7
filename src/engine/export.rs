//! Batch export: the PDF bytes of the selected annexes packed into a
//! deterministic ZIP archive. Entry order follows store order and is the
//! integrity anchor for downstream verification.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::document::zip::{build_archive, ZipEntry};
use crate::error::{EngineError, EngineResult};
use crate::store::models::{AnnexStatus, AuthenticatedActor, Role};

use super::annexes::annex_file_name;
use super::{append_audit, format_date, now, Engine};

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ExportFilters {
    pub participant_ids: Option<Vec<String>>,
    pub annex_ids: Option<Vec<String>>,
    pub signed_only: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ExportArchive {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub count: usize,
}

impl Engine {
    /// Export the annexes visible to the actor, optionally narrowed by
    /// participant ids, annex ids and a signed-only filter.
    pub fn batch_export(
        &self,
        actor: &AuthenticatedActor,
        filters: ExportFilters,
    ) -> EngineResult<ExportArchive> {
        let mut state = self.store().write();

        let allowed_participant_ids: HashSet<String> = match actor.role {
            Role::Administrator => state
                .participants
                .iter()
                .map(|participant| participant.id.clone())
                .collect(),
            Role::Instructor => state.participant_ids_for_instructor(&actor.user_id),
            Role::Participant => state
                .participants
                .iter()
                .filter(|participant| {
                    participant.user_id.as_deref() == Some(actor.user_id.as_str())
                })
                .map(|participant| participant.id.clone())
                .collect(),
        };

        let participant_filter: Option<HashSet<&String>> = filters
            .participant_ids
            .as_ref()
            .filter(|ids| !ids.is_empty())
            .map(|ids| ids.iter().collect());
        let annex_filter: Option<HashSet<&String>> = filters
            .annex_ids
            .as_ref()
            .filter(|ids| !ids.is_empty())
            .map(|ids| ids.iter().collect());
        let signed_only = filters.signed_only.unwrap_or(false);

        let entries = state
            .annexes
            .iter()
            .filter(|annex| allowed_participant_ids.contains(&annex.participant_id))
            .filter(|annex| {
                participant_filter
                    .as_ref()
                    .map(|ids| ids.contains(&annex.participant_id))
                    .unwrap_or(true)
            })
            .filter(|annex| {
                annex_filter
                    .as_ref()
                    .map(|ids| ids.contains(&annex.id))
                    .unwrap_or(true)
            })
            .filter(|annex| !signed_only || annex.status == AnnexStatus::Signed)
            .map(|annex| {
                let participant = state.participant(&annex.participant_id)?;
                Ok(ZipEntry {
                    name: annex_file_name(annex.annex_type, participant),
                    data: annex.pdf_bytes.clone(),
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        if entries.is_empty() {
            return Err(EngineError::NotFound(
                "no annexes matched the export filters".to_string(),
            ));
        }

        let bytes = build_archive(&entries);
        let count = entries.len();

        append_audit(
            &mut state,
            &actor.user_id,
            "annexes_batch_exported",
            "annex",
            None,
            Some(json!({ "count": count, "signed_only": signed_only })),
        );
        info!(count, signed_only, "annexes exported");

        Ok(ExportArchive {
            file_name: format!("anexos-export-{}.zip", format_date(now())),
            bytes,
            count,
        })
    }
}
