use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::phase::PhaseType;
use super::user::Role;

/// Version tag stamped on every generated annex document.
pub const TEMPLATE_VERSION: &str = "camara-template-v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnexType {
    #[serde(rename = "annex_2")]
    Annex2,
    #[serde(rename = "annex_3")]
    Annex3,
    #[serde(rename = "annex_5")]
    Annex5,
}

impl AnnexType {
    pub fn phase_type(&self) -> PhaseType {
        match self {
            AnnexType::Annex2 => PhaseType::Diagnostic,
            AnnexType::Annex3 => PhaseType::Training,
            AnnexType::Annex5 => PhaseType::Completion,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AnnexType::Annex2 => "Anexo 2",
            AnnexType::Annex3 => "Anexo 3",
            AnnexType::Annex5 => "Anexo 5",
        }
    }

    /// Roles whose signatures are required before the annex counts as
    /// signed. A closed lookup table, not dispatch.
    pub fn required_signers(&self) -> &'static [Role] {
        match self {
            AnnexType::Annex2 => &[Role::Participant, Role::Instructor],
            AnnexType::Annex3 => &[Role::Instructor],
            AnnexType::Annex5 => &[Role::Participant, Role::Instructor, Role::Administrator],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnnexType::Annex2 => "annex_2",
            AnnexType::Annex3 => "annex_3",
            AnnexType::Annex5 => "annex_5",
        }
    }
}

impl std::fmt::Display for AnnexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnexStatus {
    Generated,
    Signed,
}

/// At most one annex exists per (participant, annex type); regeneration
/// re-renders the same record in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annex {
    pub id: String,
    pub participant_id: String,
    pub phase_id: String,
    pub annex_type: AnnexType,
    pub status: AnnexStatus,
    pub template_version: String,
    pub file_name: String,
    pub storage_path: String,
    pub content_hash: String,
    pub generated_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    #[serde(skip_serializing, default)]
    pub pdf_bytes: Vec<u8>,
}
